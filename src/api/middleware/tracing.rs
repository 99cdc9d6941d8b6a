//! HTTP request/response tracing middleware.

use std::time::Duration;

use axum::{body::Body, http::Request, response::Response};
use tower_http::classify::{ServerErrorsAsFailures, ServerErrorsFailureClass, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing::{Span, info_span};

type MakeSpan = fn(&Request<Body>) -> Span;
type OnResponse = fn(&Response, Duration, &Span);
type OnFailure = fn(ServerErrorsFailureClass, Duration, &Span);

/// Request span layer.
///
/// Each request gets an `http` span with `method` and `path`. Completion is
/// logged at `INFO` with status and latency; 5xx responses additionally at
/// `ERROR`.
///
/// ```text
/// INFO http{method=POST path=/products/create}: status=202 latency_ms=3 Request completed
/// ```
pub fn layer() -> TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    MakeSpan,
    tower_http::trace::DefaultOnRequest,
    OnResponse,
    tower_http::trace::DefaultOnBodyChunk,
    tower_http::trace::DefaultOnEos,
    OnFailure,
> {
    TraceLayer::new_for_http()
        .make_span_with(make_span as MakeSpan)
        .on_response(on_response as OnResponse)
        .on_failure(on_failure as OnFailure)
}

fn make_span(request: &Request<Body>) -> Span {
    info_span!(
        "http",
        method = %request.method(),
        path = %request.uri().path(),
    )
}

fn on_response(response: &Response, latency: Duration, _span: &Span) {
    tracing::info!(
        status = response.status().as_u16(),
        latency_ms = latency.as_millis() as u64,
        "Request completed"
    );
}

fn on_failure(failure: ServerErrorsFailureClass, latency: Duration, _span: &Span) {
    tracing::error!(
        failure = %failure,
        latency_ms = latency.as_millis() as u64,
        "Request failed"
    );
}
