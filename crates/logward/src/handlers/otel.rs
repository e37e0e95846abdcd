//! OpenTelemetry correlation decorator.

use std::sync::Arc;

use opentelemetry::trace::TraceContextExt;

use crate::{
    context::Context,
    handler::{EmitError, Handler},
    level::Level,
    record::{Attr, Record},
};

/// Wraps a base handler and stamps the active span's trace identifiers
/// onto every record, so log lines can be joined with distributed traces.
///
/// The identifiers come from the ambient OpenTelemetry context of the
/// emitting thread; records produced outside any sampled span pass through
/// unchanged.
#[derive(Debug)]
pub struct OtelHandler {
    inner: Arc<dyn Handler>,
}

impl OtelHandler {
    /// Decorates `inner` with trace correlation.
    pub fn new(inner: Arc<dyn Handler>) -> Self {
        Self { inner }
    }
}

impl Handler for OtelHandler {
    fn enabled(&self, level: Level) -> bool {
        self.inner.enabled(level)
    }

    fn handle(&self, cx: &Context, mut record: Record) -> Result<(), EmitError> {
        let otel_cx = opentelemetry::Context::current();
        let span = otel_cx.span();
        let span_context = span.span_context();
        if span_context.is_valid() {
            record
                .attrs
                .push(Attr::new("trace_id", span_context.trace_id().to_string()));
            record
                .attrs
                .push(Attr::new("span_id", span_context.span_id().to_string()));
        }
        self.inner.handle(cx, record)
    }

    fn with_attrs(&self, attrs: Vec<Attr>) -> Arc<dyn Handler> {
        Arc::new(Self {
            inner: self.inner.with_attrs(attrs),
        })
    }

    fn with_group(&self, name: &str) -> Arc<dyn Handler> {
        Arc::new(Self {
            inner: self.inner.with_group(name),
        })
    }
}
