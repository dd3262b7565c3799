//! CLI command implementations.

pub mod check;
pub mod routes;
pub mod serve;
