//! Structured-log pipeline with trace correlation and remote collector delivery.

#[macro_use]
pub mod pipeline;

pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod sinks;

pub use config::schema::{PipelineConfig, ServiceConfig};
pub use context::TraceContext;
pub use error::ConfigError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::{Args, Level, LogRecord, LoggerPipeline};
