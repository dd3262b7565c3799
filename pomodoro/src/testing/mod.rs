//! Testing utilities.
//!
//! [`TestClient`] dispatches synthetic requests straight into an
//! application's middleware stack and router, without binding a socket.

mod client;

pub use client::{TestClient, TestRequestBuilder, TestResponse};
