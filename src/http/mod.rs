//! Demo HTTP host.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, TraceLayer, timeout)
//!     → context::TraceContextLayer (traceparent → task-local TraceContext)
//!     → forecast.rs (mock data, one Information record per request)
//! ```

pub mod forecast;
pub mod server;

pub use forecast::WeatherForecast;
pub use server::{AppState, HttpServer};
