//! Record dispatch.
//!
//! # Data Flow
//! ```text
//! LoggerPipeline::log
//!     → dispatcher.rs (per-sink level check, failure isolation)
//!         → Sink::emit
//!             → tracker.rs (collector deliveries reserve an in-flight slot)
//! ```

pub mod dispatcher;
pub mod tracker;

pub use dispatcher::Dispatcher;
pub use tracker::{DeliveryGuard, DeliveryId, DeliveryTracker};
