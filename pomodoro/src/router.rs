//! HTTP routing.
//!
//! The [`Router`] type collects route definitions and matches incoming
//! requests to the appropriate handlers.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, Request, Response};

use crate::context::RequestContext;
use crate::error::Error;
use crate::response::{BoxBody, IntoResponse};
use crate::state::AppState;

/// Path parameters captured from `:name` segments.
pub type PathParams = HashMap<String, String>;

type BoxFuture = Pin<Box<dyn Future<Output = Response<BoxBody>> + Send>>;
type HandlerFn = Box<dyn Fn(Request<Bytes>, PathParams, Arc<AppState>) -> BoxFuture + Send + Sync>;

pub(crate) struct Route {
    pub(crate) pattern: String,
    handler: HandlerFn,
}

/// The HTTP router for matching requests to handlers.
///
/// Routes are matched in the order they are added. Use path parameters
/// with the `:param` syntax.
///
/// # Examples
///
/// ```
/// use pomodoro::prelude::*;
///
/// let router = Router::new()
///     .get("/", |_, _, _| async { "Pomodoro" })
///     .get("/sessions/:id", |_, _, _| async { "Session" })
///     .post("/sessions", |_, _, _| async { StatusCode::CREATED });
/// ```
pub struct Router {
    pub(crate) routes: Vec<(Method, Route)>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Adds a route with the given HTTP method and pattern.
    pub fn route<F, Fut, Out>(mut self, method: Method, pattern: &str, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, PathParams, Arc<AppState>) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        let handler = Box::new(
            move |req: Request<Bytes>, params: PathParams, state: Arc<AppState>| {
                let handler = handler.clone();
                Box::pin(async move {
                    let output = handler(req, params, state).await;
                    output.into_response()
                }) as BoxFuture
            },
        );

        let route = Route {
            pattern: pattern.to_string(),
            handler,
        };

        self.routes.push((method, route));
        self
    }

    /// Adds a GET route.
    pub fn get<F, Fut, Out>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, PathParams, Arc<AppState>) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        self.route(Method::GET, pattern, handler)
    }

    /// Adds a POST route.
    pub fn post<F, Fut, Out>(self, pattern: &str, handler: F) -> Self
    where
        F: Fn(Request<Bytes>, PathParams, Arc<AppState>) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = Out> + Send + 'static,
        Out: IntoResponse + 'static,
    {
        self.route(Method::POST, pattern, handler)
    }

    /// Returns the registered `(method, pattern)` pairs in match order.
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.routes
            .iter()
            .map(|(method, route)| (method.clone(), route.pattern.clone()))
            .collect()
    }

    /// Handles a request by matching it to a route.
    ///
    /// Unmatched requests get a `404` JSON error carrying the trace id.
    pub async fn handle(&self, req: Request<Bytes>, state: &Arc<AppState>) -> Response<BoxBody> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        for (route_method, route) in &self.routes {
            if *route_method != method {
                continue;
            }

            if let Some(params) = extract_path_params(&route.pattern, &path) {
                return (route.handler)(req, params, state.clone()).await;
            }
        }

        tracing::debug!(%method, %path, "no route matched");

        let mut error = Error::not_found(format!("no route for {} {}", method, path));
        if let Some(ctx) = req.extensions().get::<RequestContext>() {
            error = error.with_trace_id(ctx.trace_id.clone());
        }
        error.into_response()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Matches `path` against `pattern`, capturing `:name` segments.
pub fn extract_path_params(pattern: &str, path: &str) -> Option<PathParams> {
    let pattern_parts: Vec<&str> = pattern.split('/').collect();
    let path_parts: Vec<&str> = path.split('/').collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();

    for (pattern_part, path_part) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(param_name) = pattern_part.strip_prefix(':') {
            params.insert(param_name.to_string(), path_part.to_string());
        } else if pattern_part != path_part {
            return None;
        }
    }

    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_router_new() {
        let router = Router::new();
        assert!(router.routes.is_empty());
    }

    #[test]
    fn test_router_add_routes() {
        let router = Router::new()
            .get("/", |_req, _params, _state| async { StatusCode::OK })
            .post("/sessions", |_req, _params, _state| async {
                StatusCode::CREATED
            })
            .route(
                Method::DELETE,
                "/sessions/:id",
                |_req, _params, _state| async { StatusCode::NO_CONTENT },
            );

        assert_eq!(
            router.routes(),
            vec![
                (Method::GET, "/".to_string()),
                (Method::POST, "/sessions".to_string()),
                (Method::DELETE, "/sessions/:id".to_string()),
            ]
        );
    }

    #[test]
    fn test_extract_path_params_exact_match() {
        let params = extract_path_params("/health", "/health").unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_extract_path_params_root() {
        assert!(extract_path_params("/", "/").is_some());
        assert!(extract_path_params("/", "/health").is_none());
    }

    #[test]
    fn test_extract_path_params_single_param() {
        let params = extract_path_params("/sessions/:id", "/sessions/42").unwrap();
        assert_eq!(params.get("id"), Some(&"42".to_string()));
    }

    #[test]
    fn test_extract_path_params_mismatch() {
        assert!(extract_path_params("/sessions/:id", "/breaks/42").is_none());
        assert!(extract_path_params("/sessions/:id", "/sessions/42/extra").is_none());
    }

    #[tokio::test]
    async fn test_handle_first_match_wins() {
        let router = Router::new()
            .get("/sessions/current", |_, _, _| async { "current" })
            .get("/sessions/:id", |_, _, _| async { "by id" });

        let state = Arc::new(AppState::new());
        let req = Request::get("/sessions/current").body(Bytes::new()).unwrap();
        let response = router.handle(req, &state).await;

        use http_body_util::BodyExt;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"current");
    }

    #[tokio::test]
    async fn test_handle_method_mismatch_is_not_found() {
        let router = Router::new().post("/", |_, _, _| async { StatusCode::CREATED });

        let state = Arc::new(AppState::new());
        let mut req = Request::get("/").body(Bytes::new()).unwrap();
        req.extensions_mut()
            .insert(RequestContext::with_trace_id("t-1".to_string()));
        let response = router.handle(req, &state).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        use http_body_util::BodyExt;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["trace_id"], "t-1");
        assert_eq!(json["error"]["message"], "no route for GET /");
    }
}
