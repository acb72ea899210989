//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → PipelineConfig handed to LoggerPipeline::from_config once
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no runtime reconfiguration
//! - All fields have defaults to allow minimal configs
//! - Trust policy defaults to Strict; TrustAll must be spelled out
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_with_overrides, parse_config};
pub use schema::{
    CollectorTarget, ConsoleTarget, DeliveryConfig, ObservabilityConfig, PipelineConfig,
    RetryConfig, ServerConfig, ServiceConfig, SinkTarget, TrustPolicy,
};
