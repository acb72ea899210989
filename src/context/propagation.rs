//! W3C Trace Context propagation for inbound requests.
//!
//! This module parses and formats the `traceparent` header and provides a
//! tower layer that scopes every request in a [`TraceContext`].
//!
//! See: https://www.w3.org/TR/trace-context/

use axum::http::{HeaderMap, Request};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use super::trace::{normalise_id, scope, TraceContext};

/// Header name for W3C traceparent
pub const TRACEPARENT_HEADER: &str = "traceparent";

impl TraceContext {
    /// Parse a `traceparent` header value as the caller's span.
    ///
    /// The returned context *is* the remote span; use [`TraceContext::child`]
    /// to open the local server span under it.
    pub fn from_traceparent(value: &str) -> Option<Self> {
        let mut parts = value.trim().split('-');
        let version = parts.next()?;
        let trace_id = parts.next()?;
        let span_id = parts.next()?;
        let flags = parts.next()?;

        if version.len() != 2 || !version.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        // Version ff is forbidden; version 00 must have exactly four fields.
        if version.eq_ignore_ascii_case("ff") || (version == "00" && parts.next().is_some()) {
            return None;
        }
        if flags.len() != 2 || !flags.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let flags = u8::from_str_radix(flags, 16).ok()?;

        let trace_id = normalise_id(trace_id, 32)?;
        let span_id = normalise_id(span_id, 16)?;
        let ctx = TraceContext::from_parts(&trace_id, &span_id, None)?;
        Some(ctx.with_sampled(flags & 0x01 == 0x01))
    }

    /// Format this span as a `traceparent` header value.
    pub fn to_traceparent(&self) -> String {
        format!(
            "00-{}-{}-{:02x}",
            self.trace_id(),
            self.span_id(),
            u8::from(self.is_sampled())
        )
    }

    /// Server span for a request carrying `headers`.
    ///
    /// Continues the caller's trace when a valid `traceparent` is present,
    /// otherwise starts a new one.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(TRACEPARENT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(TraceContext::from_traceparent)
            .map(|remote| remote.child())
            .unwrap_or_else(TraceContext::new_root)
    }
}

/// Layer that makes a [`TraceContext`] active for each request.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceContextLayer;

impl<S> Layer<S> for TraceContextLayer {
    type Service = TraceContextService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TraceContextService { inner }
    }
}

/// Service produced by [`TraceContextLayer`].
#[derive(Debug, Clone)]
pub struct TraceContextService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for TraceContextService<S>
where
    S: Service<Request<B>>,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<S::Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<B>) -> Self::Future {
        let context = TraceContext::from_headers(request.headers());
        request_span_entered(&context);
        let future = self.inner.call(request);
        Box::pin(scope(context, future))
    }
}

fn request_span_entered(context: &TraceContext) {
    tracing::trace!(
        trace_id = %context.trace_id(),
        span_id = %context.span_id(),
        parent_id = ?context.parent_id(),
        "Trace context scoped for request"
    );
}
