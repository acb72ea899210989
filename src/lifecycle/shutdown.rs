//! Ordered shutdown of the host.
//!
//! The HTTP server is stopped and awaited first; only then is the log
//! pipeline drained, so records logged by requests finishing during the
//! HTTP drain are still delivered.

use std::io;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::pipeline::LoggerPipeline;

/// Shutdown coordinator.
///
/// Long-running tasks subscribe to the broadcast; [`drain`](Self::drain)
/// fires it and runs the stop sequence.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every subscriber. Triggering twice is harmless.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    /// Subscribers still listening.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Stop `server`, wait for it to finish, then drain `pipeline` within `grace`.
    ///
    /// Returns `true` if every log delivery completed.
    pub async fn drain(
        &self,
        server: JoinHandle<Result<(), io::Error>>,
        pipeline: &LoggerPipeline,
        grace: Duration,
    ) -> bool {
        self.trigger();

        match server.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!(error = %e, "HTTP server failed"),
            Err(e) => tracing::error!(error = %e, "HTTP server task panicked"),
        }

        pipeline.shutdown(grace).await
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
