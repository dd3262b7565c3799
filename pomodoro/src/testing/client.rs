//! In-process test client.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde::{Serialize, de::DeserializeOwned};

use crate::app::{App, AppService};

/// A client that issues synthetic requests against an [`App`].
///
/// No network I/O happens: requests are built as `http::Request<Bytes>`
/// and handed to the application's dispatcher directly.
///
/// # Examples
///
/// ```
/// use pomodoro::prelude::*;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let app = App::new().router(Router::new().get("/", |_, _, _| async { "Pomodoro" }));
///
/// let client = app.test_client();
/// let response = client.get("/").send().await;
///
/// assert_eq!(response.status(), StatusCode::OK);
/// assert_eq!(response.text(), "Pomodoro");
/// # }
/// ```
#[derive(Clone)]
pub struct TestClient {
    service: AppService,
}

impl TestClient {
    pub fn new(app: App) -> Self {
        Self::from_service(app.into_service())
    }

    pub fn from_service(service: AppService) -> Self {
        Self { service }
    }

    pub fn get(&self, path: &str) -> TestRequestBuilder<'_> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> TestRequestBuilder<'_> {
        self.request(Method::POST, path)
    }

    pub fn request(&self, method: Method, path: &str) -> TestRequestBuilder<'_> {
        TestRequestBuilder::new(self, method, path)
    }
}

/// Builder for a single synthetic request.
pub struct TestRequestBuilder<'a> {
    client: &'a TestClient,
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
}

impl<'a> TestRequestBuilder<'a> {
    fn new(client: &'a TestClient, method: Method, path: &str) -> Self {
        Self {
            client,
            method,
            path: path.to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Adds a header to the request.
    ///
    /// # Panics
    ///
    /// Panics if `key` or `value` is not a valid header.
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(
            HeaderName::from_bytes(key.as_bytes()).expect("invalid header name"),
            HeaderValue::from_str(value).expect("invalid header value"),
        );
        self
    }

    /// Sets a JSON body on the request.
    ///
    /// # Panics
    ///
    /// Panics if `body` cannot be serialized.
    pub fn json<T: Serialize>(mut self, body: &T) -> Self {
        self.body = Bytes::from(serde_json::to_vec(body).expect("failed to serialize JSON body"));
        self.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sends the request and collects the response.
    ///
    /// # Panics
    ///
    /// Panics if the path is not a valid URI.
    pub async fn send(self) -> TestResponse {
        let mut request = Request::builder()
            .method(self.method)
            .uri(self.path.as_str())
            .body(self.body)
            .unwrap_or_else(|e| panic!("invalid test request for '{}': {}", self.path, e));
        *request.headers_mut() = self.headers;

        let response = self.client.service.call(request).await;

        let status = response.status();
        let headers = response.headers().clone();
        let body = match response.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// A fully collected response.
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the raw body bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Returns `true` if `needle` occurs as a contiguous byte sequence in
    /// the body. The comparison is case-sensitive.
    pub fn body_contains(&self, needle: &[u8]) -> bool {
        needle.is_empty() || self.body.windows(needle.len()).any(|window| window == needle)
    }

    /// Deserializes the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).expect("response body is not the expected JSON")
    }

    pub fn try_json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}
