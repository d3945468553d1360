use std::net::SocketAddr;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use webacl_provider::DynProvider;
use webacl_provider_memory::create_provider;
use webacl_reconciler::WebAclController;

use crate::{config::AppConfig, handlers, middleware as app_middleware};

/// Shared by every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    pub controller: WebAclController,
    pub finalize_enabled: bool,
}

pub struct WebAclServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(cfg: &AppConfig, controller: WebAclController) -> Router {
    let body_limit = cfg.server.body_limit_bytes;
    let state = AppState {
        controller,
        finalize_enabled: cfg.controller.finalize_enabled,
    };

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .route("/readyz", get(handlers::readyz))
        .route("/sync", post(handlers::sync))
        .route("/finalize", post(handlers::finalize))
        .with_state(state)
        // Layers run bottom-up: request id -> cors -> trace -> handler
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    let req_id = req
                        .extensions()
                        .get::<axum::http::HeaderValue>()
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("")
                        .to_string();
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri(),
                        http.status_code = Empty,
                        request_id = %req_id
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(app_middleware::request_id))
        .layer(axum::extract::DefaultBodyLimit::max(body_limit))
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
    provider: Option<DynProvider>,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
            provider: None,
        }
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    /// Uses `provider` instead of building one from `provider.backend`.
    pub fn with_provider(mut self, provider: DynProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn build(self) -> anyhow::Result<WebAclServer> {
        let provider = match self.provider {
            Some(provider) => provider,
            None => {
                let provider_cfg = self
                    .config
                    .provider_config()
                    .map_err(anyhow::Error::msg)?;
                create_provider(&provider_cfg)
            }
        };
        tracing::info!(
            backend = provider.backend_name(),
            captain_domain = %self.config.controller.captain_domain,
            finalize_enabled = self.config.controller.finalize_enabled,
            "controller configured"
        );
        let controller = WebAclController::new(provider, self.config.controller_settings());
        let app = build_app(&self.config, controller);

        Ok(WebAclServer {
            addr: self.addr,
            app,
        })
    }
}

impl WebAclServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
