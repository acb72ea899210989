//! HTTP server for the demo host.
//!
//! # Responsibilities
//! - Create the Axum router with the demo handlers
//! - Wire up middleware (trace context, timeout, request tracing)
//! - Serve until the shutdown broadcast fires, then drain

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::context::TraceContextLayer;
use crate::http::forecast;
use crate::pipeline::LoggerPipeline;

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub logger: LoggerPipeline,
}

/// HTTP server hosting the demo endpoints.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &ServerConfig, logger: LoggerPipeline) -> Self {
        let state = AppState { logger };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// `TraceContextLayer` sits inside `TraceLayer` so the request span is
    /// opened before the trace context is scoped onto the handler future.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/weatherforecast", get(forecast::get_forecast))
            .route("/health", get(health))
            .with_state(state)
            .layer(TraceContextLayer)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then finish in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Level;
    use crate::sinks::ConsoleSink;
    use std::sync::Arc;

    async fn serve() -> (std::net::SocketAddr, crate::lifecycle::Shutdown) {
        let logger = LoggerPipeline::builder()
            .console(Arc::new(ConsoleSink::with_writer(std::io::sink(), Level::Debug)))
            .build()
            .unwrap();
        let server = HttpServer::new(&ServerConfig::default(), logger);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = crate::lifecycle::Shutdown::new();
        let rx = shutdown.subscribe();
        tokio::spawn(server.run(listener, rx));
        (addr, shutdown)
    }

    #[tokio::test]
    async fn test_forecast_and_health() {
        let (addr, shutdown) = serve().await;
        let client = reqwest::Client::new();

        let forecast: Vec<Value> = client
            .get(format!("http://{}/weatherforecast", addr))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(forecast.len(), 5);
        assert!(forecast[0]["temperatureF"].is_i64());

        let health = client
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap();
        assert!(health.status().is_success());

        shutdown.trigger();
    }
}
