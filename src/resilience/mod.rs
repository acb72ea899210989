//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Collector delivery task:
//!     → request timeout (reqwest client deadline)
//!     → On retryable failure: backoff.rs (sleep, try again)
//!     → Out of attempts: warning on the console, record dropped
//! ```
//!
//! # Design Decisions
//! - Every collector call has a deadline
//! - Retries happen inside the detached task; the caller never waits on them
//! - Only transport errors, 429 and 5xx are retried
//! - One attempt by default

pub mod backoff;

pub use backoff::Backoff;
