use bytes::Bytes;
use http::{Request, Response};
use tracing::{Instrument, info, info_span};

use crate::context::RequestContext;
use crate::response::BoxBody;

use super::{BoxFuture, Middleware, Next};

/// Wraps each request in a tracing span and logs its status and duration.
pub struct RequestLogMiddleware;

impl RequestLogMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RequestLogMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for RequestLogMiddleware {
    fn handle<'a>(
        &'a self,
        req: Request<Bytes>,
        ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response<BoxBody>> {
        let span = info_span!(
            "request",
            method = %req.method(),
            path = %req.uri().path(),
            trace_id = %ctx.trace_id,
        );

        Box::pin(
            async move {
                let response = next.run(req).await;

                info!(
                    status = response.status().as_u16(),
                    duration_ms = ctx.elapsed().as_millis() as u64,
                    "request completed"
                );

                response
            }
            .instrument(span),
        )
    }
}
