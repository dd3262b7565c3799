//! Middleware chain wrapped around the router.

mod request_log;
mod trace_id;

pub use request_log::RequestLogMiddleware;
pub use trace_id::{TRACE_ID_HEADER, TraceIdMiddleware};

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response};

use crate::context::RequestContext;
use crate::response::BoxBody;
use crate::router::Router;
use crate::state::AppState;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait Middleware: Send + Sync + 'static {
    fn handle<'a>(
        &'a self,
        req: Request<Bytes>,
        ctx: &'a RequestContext,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response<BoxBody>>;
}

/// The remainder of the chain after the current middleware.
pub struct Next<'a> {
    middlewares: &'a [Arc<dyn Middleware>],
    router: &'a Router,
    state: &'a Arc<AppState>,
    ctx: &'a RequestContext,
}

impl<'a> Next<'a> {
    pub(crate) fn new(
        middlewares: &'a [Arc<dyn Middleware>],
        router: &'a Router,
        state: &'a Arc<AppState>,
        ctx: &'a RequestContext,
    ) -> Self {
        Self {
            middlewares,
            router,
            state,
            ctx,
        }
    }

    pub async fn run(self, req: Request<Bytes>) -> Response<BoxBody> {
        if let Some((current, rest)) = self.middlewares.split_first() {
            let next = Next {
                middlewares: rest,
                router: self.router,
                state: self.state,
                ctx: self.ctx,
            };
            current.handle(req, self.ctx, next).await
        } else {
            self.router.handle(req, self.state).await
        }
    }
}

/// Middlewares in registration order; the first added runs outermost.
pub struct MiddlewareStack {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareStack {
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    pub fn add<M: Middleware>(&mut self, middleware: M) {
        self.middlewares.push(Arc::new(middleware));
    }

    pub async fn execute(
        &self,
        req: Request<Bytes>,
        router: &Router,
        state: &Arc<AppState>,
        ctx: &RequestContext,
    ) -> Response<BoxBody> {
        let next = Next::new(&self.middlewares, router, state, ctx);
        next.run(req).await
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl Default for MiddlewareStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Middleware for Recorder {
        fn handle<'a>(
            &'a self,
            req: Request<Bytes>,
            _ctx: &'a RequestContext,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response<BoxBody>> {
            Box::pin(async move {
                self.log.lock().unwrap().push(self.name);
                next.run(req).await
            })
        }
    }

    #[tokio::test]
    async fn test_stack_runs_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut stack = MiddlewareStack::new();
        stack.add(Recorder {
            name: "outer",
            log: log.clone(),
        });
        stack.add(Recorder {
            name: "inner",
            log: log.clone(),
        });
        assert_eq!(stack.len(), 2);

        let router = Router::new().get("/", |_, _, _| async { "ok" });
        let state = Arc::new(AppState::new());
        let ctx = RequestContext::new();
        let req = Request::get("/").body(Bytes::new()).unwrap();

        let response = stack.execute(req, &router, &state, &ctx).await;

        assert_eq!(response.status(), http::StatusCode::OK);
        assert_eq!(*log.lock().unwrap(), vec!["outer", "inner"]);
    }
}
