//! In-flight delivery tracking.
//!
//! # Responsibilities
//! - Bound the number of concurrent collector deliveries
//! - Hand each delivery a guard that releases its slot on drop
//! - Let shutdown wait, with a deadline, for deliveries to finish

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

use crate::observability::metrics;

/// Global atomic counter for delivery ids.
/// Using relaxed ordering is sufficient since we only need uniqueness, not synchronization.
static DELIVERY_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for one delivery, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeliveryId(u64);

impl DeliveryId {
    fn next() -> Self {
        Self(DELIVERY_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for DeliveryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "delivery-{}", self.0)
    }
}

#[derive(Debug)]
struct Shared {
    active: AtomicUsize,
    limit: usize,
    idle: Notify,
}

/// Counts running deliveries and refuses new ones past the limit.
#[derive(Debug, Clone)]
pub struct DeliveryTracker {
    shared: Arc<Shared>,
}

impl DeliveryTracker {
    pub fn new(limit: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                active: AtomicUsize::new(0),
                limit: limit.max(1),
                idle: Notify::new(),
            }),
        }
    }

    /// Reserve a slot, or `None` if `limit` deliveries are already running.
    pub fn try_track(&self) -> Option<DeliveryGuard> {
        let reserved = self
            .shared
            .active
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |active| {
                (active < self.shared.limit).then_some(active + 1)
            });

        match reserved {
            Ok(previous) => {
                metrics::record_in_flight(previous + 1);
                Some(DeliveryGuard {
                    shared: Arc::clone(&self.shared),
                    id: DeliveryId::next(),
                })
            }
            Err(_) => None,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.shared.active.load(Ordering::Acquire)
    }

    pub fn limit(&self) -> usize {
        self.shared.limit
    }

    /// Wait until no delivery is running, for at most `grace`.
    ///
    /// Returns `true` if the tracker drained in time.
    pub async fn wait_idle(&self, grace: Duration) -> bool {
        tokio::time::timeout(grace, self.drained()).await.is_ok()
    }

    async fn drained(&self) {
        loop {
            let notified = self.shared.idle.notified();
            tokio::pin!(notified);
            // Register before checking so a guard dropped in between still wakes us.
            notified.as_mut().enable();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Guard that tracks a delivery's lifetime.
/// Releases its slot when dropped.
#[derive(Debug)]
pub struct DeliveryGuard {
    shared: Arc<Shared>,
    id: DeliveryId,
}

impl DeliveryGuard {
    pub fn id(&self) -> DeliveryId {
        self.id
    }
}

impl Drop for DeliveryGuard {
    fn drop(&mut self) {
        let previous = self.shared.active.fetch_sub(1, Ordering::AcqRel);
        metrics::record_in_flight(previous - 1);
        if previous == 1 {
            self.shared.idle.notify_waiters();
        }
        tracing::trace!(delivery_id = %self.id, "Delivery finished");
    }
}
