//! Error types for the Vigil community bot.
//!
//! This crate provides the foundation error types used throughout the Vigil
//! workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error
//! handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use vigil_error::{ConfigError, VigilResult};
//!
//! fn load_settings() -> VigilResult<String> {
//!     Err(ConfigError::new("missing role_name"))?
//! }
//!
//! match load_settings() {
//!     Ok(data) => println!("Got: {}", data),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod server;
mod workflow;

pub use config::ConfigError;
pub use error::{VigilError, VigilErrorKind, VigilResult};
pub use server::{ServerError, ServerErrorKind};
pub use workflow::{WorkflowError, WorkflowErrorKind, WorkflowResult};
