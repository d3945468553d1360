use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use webacl_provider_memory::{MemoryProviderOptions, ProviderBackend, ProviderConfig};
use webacl_reconciler::ControllerSettings;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub provider: ProviderSettings,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if self.server.body_limit_bytes == 0 {
            return Err("server.body_limit_bytes must be > 0".into());
        }
        if normalize_level(&self.logging.level).is_none() {
            return Err(format!(
                "logging.level must be one of {VALID_LEVELS:?}, got '{}'",
                self.logging.level
            ));
        }
        self.provider.backend()?;
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        use std::net::{IpAddr, Ipv4Addr};
        let host: IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));
        SocketAddr::from((host, self.server.port))
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings::new(self.controller.captain_domain.clone())
    }

    pub fn provider_config(&self) -> Result<ProviderConfig, String> {
        Ok(ProviderConfig {
            backend: self.provider.backend()?,
            memory: MemoryProviderOptions {
                region: self.provider.region.clone(),
                account_id: self.provider.account_id.clone(),
                scope: self.provider.scope.clone(),
            },
        })
    }

    /// The `EnvFilter` directive for the configured level.
    pub fn log_filter(&self) -> &'static str {
        normalize_level(&self.logging.level).unwrap_or("warn")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_body_limit() -> usize {
    1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "WARNING".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

const VALID_LEVELS: [&str; 10] = [
    "trace", "notset", "debug", "info", "warn", "warning", "error", "critical", "fatal", "off",
];

/// Maps a level name, including the Python-style `WARNING`/`CRITICAL`, to a
/// tracing filter directive.
pub fn normalize_level(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" | "notset" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" | "critical" | "fatal" => Some("error"),
        "off" => Some("off"),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Value of the `captain_domain` tag stamped on every WebACL.
    #[serde(default)]
    pub captain_domain: String,
    /// Serve the tag-based finalizer on `/finalize` instead of the no-op stub.
    #[serde(default)]
    pub finalize_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_account_id")]
    pub account_id: String,
    #[serde(default = "default_scope")]
    pub scope: String,
}

fn default_backend() -> String {
    ProviderBackend::default().to_string()
}
fn default_region() -> String {
    MemoryProviderOptions::default().region
}
fn default_account_id() -> String {
    MemoryProviderOptions::default().account_id
}
fn default_scope() -> String {
    MemoryProviderOptions::default().scope
}

impl ProviderSettings {
    pub fn backend(&self) -> Result<ProviderBackend, String> {
        self.backend
            .parse()
            .map_err(|e| format!("provider.backend: {e}"))
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            region: default_region(),
            account_id: default_account_id(),
            scope: default_scope(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::env;
    use std::path::PathBuf;

    pub const DEFAULT_CONFIG_PATH: &str = "webacl.toml";

    /// Loads the file at `path` (or `webacl.toml`) if it exists, then applies
    /// `WEBACL__SECTION__KEY` variables and the bare `LOG_LEVEL` and
    /// `CAPTAIN_DOMAIN` variables on top.
    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_PATH));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // e.g. WEBACL__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("WEBACL")
                .try_parsing(true)
                .separator("__"),
        );
        builder = builder
            .set_override_option("logging.level", non_empty_var("LOG_LEVEL"))
            .and_then(|b| {
                b.set_override_option("controller.captain_domain", non_empty_var("CAPTAIN_DOMAIN"))
            })
            .map_err(|e| format!("config override error: {e}"))?;

        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }

    fn non_empty_var(key: &str) -> Option<String> {
        env::var(key).ok().filter(|v| !v.is_empty())
    }
}
