//! The active trace context and how it is read.
//!
//! The context lives in a tokio task-local slot. A request handler (or the
//! [`TraceContextLayer`](super::TraceContextLayer)) enters a scope, and every
//! log call made while that scope is active picks the ids up through
//! [`current`]. Outside any scope there is simply no context.

use rand::Rng;
use std::fmt;
use std::future::Future;

tokio::task_local! {
    static CURRENT: TraceContext;
}

/// Position of the current work in a distributed trace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraceContext {
    trace_id: String,
    span_id: String,
    parent_id: Option<String>,
    sampled: bool,
}

impl TraceContext {
    /// Start a new trace with a fresh root span.
    pub fn new_root() -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().simple().to_string(),
            span_id: new_span_id(),
            parent_id: None,
            sampled: true,
        }
    }

    /// Build a context from known ids.
    ///
    /// Ids are normalised to lowercase; `None` is returned if any is not
    /// valid non-zero hex of the W3C length (32 for trace, 16 for spans).
    pub fn from_parts(trace_id: &str, span_id: &str, parent_id: Option<&str>) -> Option<Self> {
        let trace_id = normalise_id(trace_id, 32)?;
        let span_id = normalise_id(span_id, 16)?;
        let parent_id = match parent_id {
            Some(id) => Some(normalise_id(id, 16)?),
            None => None,
        };
        Some(Self {
            trace_id,
            span_id,
            parent_id,
            sampled: true,
        })
    }

    /// A new span in the same trace, parented on this one.
    pub fn child(&self) -> Self {
        Self {
            trace_id: self.trace_id.clone(),
            span_id: new_span_id(),
            parent_id: Some(self.span_id.clone()),
            sampled: self.sampled,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn span_id(&self) -> &str {
        &self.span_id
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn is_sampled(&self) -> bool {
        self.sampled
    }

    pub(crate) fn with_sampled(mut self, sampled: bool) -> Self {
        self.sampled = sampled;
        self
    }
}

impl fmt::Display for TraceContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "traceId={}, spanId={}", self.trace_id, self.span_id)?;
        if let Some(parent) = &self.parent_id {
            write!(f, ", parentId={}", parent)?;
        }
        Ok(())
    }
}

/// The context active on the calling task, if any.
pub fn current() -> Option<TraceContext> {
    CURRENT.try_with(|ctx| ctx.clone()).ok()
}

/// Run `future` with `context` as the active trace context.
pub async fn scope<F>(context: TraceContext, future: F) -> F::Output
where
    F: Future,
{
    CURRENT.scope(context, future).await
}

/// Run `f` synchronously with `context` as the active trace context.
pub fn sync_scope<F, R>(context: TraceContext, f: F) -> R
where
    F: FnOnce() -> R,
{
    CURRENT.sync_scope(context, f)
}

fn new_span_id() -> String {
    let mut rng = rand::thread_rng();
    loop {
        let id: u64 = rng.gen();
        if id != 0 {
            return format!("{:016x}", id);
        }
    }
}

pub(crate) fn normalise_id(id: &str, len: usize) -> Option<String> {
    if id.len() != len || !id.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    if id.bytes().all(|b| b == b'0') {
        return None;
    }
    Some(id.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_ids_have_w3c_shape() {
        let ctx = TraceContext::new_root();
        assert_eq!(ctx.trace_id().len(), 32);
        assert_eq!(ctx.span_id().len(), 16);
        assert!(ctx.parent_id().is_none());
        assert!(ctx.trace_id().bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn test_child_links_parent() {
        let root = TraceContext::new_root();
        let child = root.child();
        assert_eq!(child.trace_id(), root.trace_id());
        assert_eq!(child.parent_id(), Some(root.span_id()));
        assert_ne!(child.span_id(), root.span_id());
    }

    #[test]
    fn test_from_parts_rejects_bad_ids() {
        assert!(TraceContext::from_parts("abc", "b7ad6b7169203331", None).is_none());
        assert!(TraceContext::from_parts(
            "00000000000000000000000000000000",
            "b7ad6b7169203331",
            None
        )
        .is_none());
        let ctx = TraceContext::from_parts(
            "0AF7651916CD43DD8448EB211C80319C",
            "b7ad6b7169203331",
            Some("00f067aa0ba902b7"),
        )
        .unwrap();
        assert_eq!(ctx.trace_id(), "0af7651916cd43dd8448eb211c80319c");
    }

    #[test]
    fn test_no_context_outside_scope() {
        assert!(current().is_none());
    }

    #[test]
    fn test_sync_scope_exposes_context() {
        let ctx = TraceContext::new_root();
        let seen = sync_scope(ctx.clone(), current);
        assert_eq!(seen, Some(ctx));
        assert!(current().is_none());
    }

    #[tokio::test]
    async fn test_async_scope_is_task_local() {
        let ctx = TraceContext::new_root();
        let inner = ctx.clone();
        scope(ctx.clone(), async move {
            assert_eq!(current(), Some(inner));
            let other = tokio::spawn(async { current() }).await.unwrap();
            assert!(other.is_none(), "spawned tasks do not inherit the slot");
        })
        .await;
    }
}
