use std::sync::Arc;

use bytes::Bytes;
use http::{Request, Response};

use crate::context::RequestContext;
use crate::middleware::{Middleware, MiddlewareStack, TRACE_ID_HEADER};
use crate::observability::TracingConfig;
use crate::response::BoxBody;
use crate::router::Router;
use crate::server::{resolve_addr, serve};
use crate::state::AppState;
use crate::testing::TestClient;

/// An application: a route table, shared state and a middleware stack.
///
/// # Examples
///
/// ```
/// use pomodoro::prelude::*;
///
/// let app = App::new().router(Router::new().get("/", |_, _, _| async { "Pomodoro" }));
/// let client = app.test_client();
/// ```
pub struct App {
    router: Router,
    state: AppState,
    middlewares: MiddlewareStack,
}

impl App {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            state: AppState::new(),
            middlewares: MiddlewareStack::new(),
        }
    }

    pub fn router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    pub fn state<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.state = self.state.with(value);
        self
    }

    pub fn middleware<M: Middleware>(mut self, middleware: M) -> Self {
        self.middlewares.add(middleware);
        self
    }

    /// Installs the global tracing subscriber.
    pub fn with_tracing(self, config: TracingConfig) -> Self {
        config.init();
        self
    }

    /// Returns the registered `(method, pattern)` pairs.
    pub fn routes(&self) -> Vec<(http::Method, String)> {
        self.router.routes()
    }

    /// Freezes the application into a cloneable request dispatcher.
    pub fn into_service(self) -> AppService {
        AppService {
            router: Arc::new(self.router),
            state: Arc::new(self.state),
            middlewares: Arc::new(self.middlewares),
        }
    }

    /// Builds an in-process test client bound to this application.
    pub fn test_client(self) -> TestClient {
        TestClient::new(self)
    }

    /// Serves the application over HTTP until Ctrl-C.
    ///
    /// `addr` may name a host (`localhost:3000`) or an IP literal.
    pub async fn listen(self, addr: &str) -> std::io::Result<()> {
        let addr = resolve_addr(addr).await?;
        serve(self.into_service(), addr).await
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared, read-only request dispatcher used by both the server and the
/// test client.
#[derive(Clone)]
pub struct AppService {
    router: Arc<Router>,
    state: Arc<AppState>,
    middlewares: Arc<MiddlewareStack>,
}

impl AppService {
    /// Runs `req` through the middleware stack and router.
    ///
    /// A [`RequestContext`] is attached to the request extensions, reusing
    /// the client's `x-trace-id` header when present.
    pub async fn call(&self, mut req: Request<Bytes>) -> Response<BoxBody> {
        let ctx = req
            .headers()
            .get(TRACE_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(|id| RequestContext::with_trace_id(id.to_string()))
            .unwrap_or_default();

        req.extensions_mut().insert(ctx.clone());

        self.middlewares
            .execute(req, &self.router, &self.state, &ctx)
            .await
    }
}
