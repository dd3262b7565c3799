//! The Pomodoro application's routes.

use std::sync::Arc;

use bytes::Bytes;
use http::Request;
use serde::Serialize;

use crate::app::App;
use crate::config::{ConfigError, Settings};
use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::middleware::{RequestLogMiddleware, TraceIdMiddleware};
use crate::response::{Html, Json};
use crate::router::{PathParams, Router};
use crate::state::AppState;

/// Builds the Pomodoro application from validated settings.
///
/// Fails if the settings are out of range, before any route is registered.
pub fn create_app(settings: Settings) -> std::result::Result<App, ConfigError> {
    settings.validate()?;

    let router = Router::new().get("/", home).get("/health", health);

    Ok(App::new()
        .middleware(RequestLogMiddleware::new())
        .middleware(TraceIdMiddleware::new())
        .state(settings)
        .router(router))
}

/// `GET /`: the timer landing page.
pub async fn home(
    req: Request<Bytes>,
    _params: PathParams,
    state: Arc<AppState>,
) -> Result<Html<String>> {
    let settings = state.get::<Settings>().ok_or_else(|| {
        let error = Error::internal("settings are not configured");
        match req.extensions().get::<RequestContext>() {
            Some(ctx) => error.with_trace_id(ctx.trace_id.clone()),
            None => error,
        }
    })?;

    Ok(Html(render_home(settings)))
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /health`: liveness probe.
pub async fn health(
    _req: Request<Bytes>,
    _params: PathParams,
    _state: Arc<AppState>,
) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn render_home(settings: &Settings) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Pomodoro Timer</title>
</head>
<body>
  <main>
    <h1>Pomodoro Timer</h1>
    <p>Work in focused sessions with short breaks in between.</p>
    <ul class="sessions">
      <li data-kind="work">Focus: {work} minutes</li>
      <li data-kind="short-break">Short break: {short} minutes</li>
      <li data-kind="long-break">Long break: {long} minutes</li>
    </ul>
  </main>
</body>
</html>
"#,
        work = settings.work_minutes,
        short = settings.short_break_minutes,
        long = settings.long_break_minutes,
    )
}
