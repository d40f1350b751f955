//! Bot server plumbing: the healthcheck/metrics HTTP API and startup wiring
//! for the `vigil-bot` binary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod server;

pub use api::{ApiState, create_router};
pub use server::serve_api;
