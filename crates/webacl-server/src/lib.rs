//! HTTP surface of the WebACL controller: the `/sync` and `/finalize` hooks
//! plus health endpoints, configuration and tracing setup.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod server;

pub use config::AppConfig;
pub use error::ApiError;
pub use observability::{apply_logging_level, init_tracing, init_tracing_with_level};
pub use server::{AppState, ServerBuilder, WebAclServer, build_app};
