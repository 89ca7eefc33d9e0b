use tracing::{Span, field};

use super::TraceId;

/// Create a root span for a refresh cycle or a connection.
pub fn root_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "root",
        name = %name,
        trace_id = %trace_id.as_str(),
        subscriber_id = field::Empty
    )
}

/// Create a child span (inherits trace_id from the enclosing root).
pub fn child_span(name: &'static str) -> Span {
    tracing::info_span!("child", name = %name, subscriber_id = field::Empty)
}
