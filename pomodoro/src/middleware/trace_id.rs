use bytes::Bytes;
use http::header::HeaderValue;
use http::{Request, Response};

use crate::context::RequestContext;
use crate::response::BoxBody;

use super::{BoxFuture, Middleware, Next};

pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Echoes the request's trace id back in the `x-trace-id` response header.
///
/// The id is taken from the incoming header when the client sent one, so a
/// caller can follow its own id through the logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraceIdMiddleware;

impl TraceIdMiddleware {
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for TraceIdMiddleware {
    fn handle<'a>(
        &'a self,
        req: Request<Bytes>,
        ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response<BoxBody>> {
        Box::pin(async move {
            let mut response = next.run(req).await;

            if let Ok(header_value) = HeaderValue::from_str(&ctx.trace_id) {
                response.headers_mut().insert(TRACE_ID_HEADER, header_value);
            }

            response
        })
    }
}
