//! Structured-log pipeline.
//!
//! # Data Flow
//! ```text
//! log_info!(logger, "Served {Count} items", Count = n)
//!     → logger.rs (minimum-level filter, context lookup)
//!     → enricher.rs (args, static properties, trace ids, clock.rs timestamp)
//!         → template.rs (parsed holes; rendered lazily by record.rs)
//!     → dispatch::Dispatcher (fan-out to sinks)
//! ```

pub mod args;
pub mod clock;
pub mod enricher;
pub mod level;
pub mod logger;
#[macro_use]
pub mod macros;
pub mod record;
pub mod template;

pub use args::Args;
pub use enricher::Enricher;
pub use level::{Level, ParseLevelError};
pub use logger::{LoggerPipeline, LoggerPipelineBuilder};
pub use record::{CollectorEvent, LogRecord};
pub use template::MessageTemplate;
