//! HTTP Server
//!
//! Builds the router and runs it until the shutdown token fires.

use crate::error::ServerError;
use crate::handler::{index, list_profiles, not_found, open_profile, save_profile};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use pprofit_core::application::{ProcessSupervisor, ProfileService, ShutdownToken};
use serde_json::json;
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

const DEFAULT_HOST: &str = "localhost";

/// Server Configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    /// 0 picks an ephemeral port
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: 0,
        }
    }
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub(crate) profiles: Arc<ProfileService>,
    pub(crate) supervisor: Arc<ProcessSupervisor>,
}

impl AppState {
    pub fn new(profiles: Arc<ProfileService>, supervisor: Arc<ProcessSupervisor>) -> Self {
        Self {
            profiles,
            supervisor,
        }
    }
}

/// Routes plus tracing and panic recovery
pub fn build_router(state: AppState) -> Router {
    with_middleware(routes().with_state(state))
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index).fallback(not_found))
        .route("/profiles", get(list_profiles).fallback(not_found))
        .route("/save", post(save_profile).fallback(not_found))
        .route("/open", post(open_profile).fallback(not_found))
        .fallback(not_found)
}

pub(crate) fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    };

    error!(panic_msg = %message, "Request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": format!("request panicked: {}", message) })),
    )
        .into_response()
}

/// A bound, not yet serving, control API
pub struct HttpServer {
    listener: TcpListener,
    router: Router,
}

impl HttpServer {
    pub async fn bind(config: &HttpServerConfig, state: AppState) -> Result<Self, ServerError> {
        let listener = TcpListener::bind((config.host.as_str(), config.port))
            .await
            .map_err(|source| ServerError::Bind {
                addr: format!("{}:{}", config.host, config.port),
                source,
            })?;

        Ok(Self {
            listener,
            router: build_router(state),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` fires, then let in-flight requests finish
    pub async fn serve(self, shutdown: ShutdownToken) -> Result<(), ServerError> {
        info!(addr = ?self.listener.local_addr().ok(), "Control API listening");
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;
        info!("Control API stopped");
        Ok(())
    }
}
