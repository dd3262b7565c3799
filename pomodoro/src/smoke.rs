//! Home page smoke check.
//!
//! Builds the application, sends one synthetic `GET /` and asserts that the
//! response is `200 OK` with `Pomodoro` somewhere in the body. Failing to
//! build the application is reported as [`SmokeError::Setup`], separately
//! from the assertion failures, and no request is sent in that case.

use std::error::Error as StdError;

use http::StatusCode;
use thiserror::Error;
use tracing::{debug, info};

use crate::app::App;
use crate::config::Settings;
use crate::routes::create_app;
use crate::testing::TestClient;

pub const HOME_PATH: &str = "/";

/// Byte sequence the home page body must contain (case-sensitive).
pub const HOME_KEYWORD: &[u8] = b"Pomodoro";

/// Longest body excerpt carried in [`SmokeError::MissingKeyword`].
const BODY_EXCERPT_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum SmokeError {
    /// The application could not be constructed.
    #[error("setup failed: {0}")]
    Setup(#[source] Box<dyn StdError + Send + Sync>),

    #[error("expected status {expected} for GET {path}, got {actual}")]
    StatusMismatch {
        path: &'static str,
        expected: StatusCode,
        actual: StatusCode,
    },

    #[error("response body for GET {path} does not contain {keyword:?}: {body:?}")]
    MissingKeyword {
        path: &'static str,
        keyword: String,
        body: String,
    },
}

impl SmokeError {
    /// `true` for setup errors, `false` for assertion failures.
    pub fn is_setup(&self) -> bool {
        matches!(self, SmokeError::Setup(_))
    }
}

/// Asserts the home page contract against an existing client.
///
/// The status is checked before the body.
pub async fn check_home(client: &TestClient) -> Result<(), SmokeError> {
    let response = client.get(HOME_PATH).send().await;
    debug!(status = %response.status(), bytes = response.bytes().len(), "home page fetched");

    if response.status() != StatusCode::OK {
        return Err(SmokeError::StatusMismatch {
            path: HOME_PATH,
            expected: StatusCode::OK,
            actual: response.status(),
        });
    }

    if !response.body_contains(HOME_KEYWORD) {
        let text = response.text();
        return Err(SmokeError::MissingKeyword {
            path: HOME_PATH,
            keyword: String::from_utf8_lossy(HOME_KEYWORD).to_string(),
            body: text.chars().take(BODY_EXCERPT_LEN).collect(),
        });
    }

    Ok(())
}

/// Runs the check against the application produced by `factory`.
pub async fn run_with<F, E>(factory: F) -> Result<(), SmokeError>
where
    F: FnOnce() -> Result<App, E>,
    E: Into<Box<dyn StdError + Send + Sync>>,
{
    let app = factory().map_err(|e| SmokeError::Setup(e.into()))?;
    let client = app.test_client();

    check_home(&client).await?;
    info!(path = HOME_PATH, "home page smoke check passed");
    Ok(())
}

/// Runs the check against the application configured from the environment.
pub async fn run() -> Result<(), SmokeError> {
    run_with(|| Settings::from_env().and_then(create_app)).await
}
