//! Per-request tracing.

use std::time::Instant;

use tracing::{info, info_span, Instrument};

use crate::handler::{from_fn, BoxedHandler};
use crate::request::Request;

/// Wraps every request in an `http.request` span carrying the method and
/// path, and emits one `info` event with the status and latency once the
/// inner handler has answered. The response passes through untouched.
///
/// ```rust,no_run
/// use absol::{middleware, Router};
///
/// # async fn hello(_: absol::Request) -> &'static str { "hello" }
/// let app = Router::new()
///     .get("/", hello)
///     .middleware(middleware::trace());
/// ```
pub fn trace() -> impl Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static {
    |next: BoxedHandler| {
        from_fn(move |req: Request| {
            let next = next.clone();
            let span = info_span!("http.request", method = %req.method(), path = %req.path());
            async move {
                let start = Instant::now();
                let res = next.call(req).await;
                info!(
                    status = res.status_code().as_u16(),
                    latency_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
                    "request served"
                );
                res
            }
            .instrument(span)
        })
    }
}
