//! Application wiring: shared state, routes, and the serve loop.

use crate::ai::{GeminiClient, ModelService};
use crate::handlers;
use crate::models::Config;
use crate::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// State shared by every handler. Holds no per-request data.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn ModelService>,
}

/// The relay server.
pub struct App {
    state: AppState,
}

impl App {
    /// Build an app around any upstream model implementation.
    ///
    /// Integration tests use this to inject a recording mock.
    pub fn with_services(model: Arc<dyn ModelService>) -> Self {
        Self {
            state: AppState { model },
        }
    }

    /// Build an app backed by the Gemini REST API.
    pub fn from_config(config: &Config) -> Self {
        let client = GeminiClient::from_config(config);
        info!("Upstream provider: Gemini (model: {})", client.model());
        Self::with_services(Arc::new(client))
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/generate-text", post(handlers::generate_text))
            .route("/generate-from-image", post(handlers::generate_from_image))
            .route("/generate-from-document", post(handlers::generate_from_document))
            .route("/generate-from-audio", post(handlers::generate_from_audio))
            // Uploads are buffered whole, with no size cap.
            .layer(DefaultBodyLimit::disable())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on `listener` until Ctrl-C or SIGTERM.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let addr = listener.local_addr()?;
        info!("Server ready on http://localhost:{}", addr.port());

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
