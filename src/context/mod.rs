//! Trace context subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → propagation.rs (traceparent header → TraceContext, child span)
//!     → trace.rs (task-local scope around the request future)
//!     → current() read by LoggerPipeline::log at emission time
//! ```
//!
//! # Design Decisions
//! - Context is carried per task, never in a process-wide global
//! - Absence of context is a normal result, not an error
//! - Spawned tasks do not inherit the slot; pass the context explicitly

pub mod propagation;
pub mod trace;

pub use propagation::{TraceContextLayer, TraceContextService, TRACEPARENT_HEADER};
pub use trace::{current, scope, sync_scope, TraceContext};
