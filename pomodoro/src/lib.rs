//! A small Pomodoro timer web application.
//!
//! The crate bundles a minimal HTTP toolkit (router, responses, errors,
//! middleware, server), the Pomodoro routes built on it, an in-process
//! [`testing::TestClient`], and the [`smoke`] check that verifies the home
//! page is served.

pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod middleware;
pub mod observability;
pub mod response;
pub mod router;
pub mod routes;
pub mod server;
pub mod smoke;
pub mod state;
pub mod testing;

pub mod prelude {
    pub use crate::app::App;
    pub use crate::config::Settings;
    pub use crate::context::RequestContext;
    pub use crate::error::{Error, Result};
    pub use crate::middleware::{Middleware, Next};
    pub use crate::observability::TracingConfig;
    pub use crate::response::{Html, IntoResponse, Json};
    pub use crate::router::{PathParams, Router};
    pub use crate::routes::create_app;
    pub use crate::state::AppState;

    pub use http::{Method, StatusCode};
}
