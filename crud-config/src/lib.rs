//! Configuration management for the CRUD web-app backends.
//!
//! Settings are read once from environment variables at startup into an
//! immutable [`Settings`] value, which is then passed to every component that
//! needs it.

mod mode;
mod settings;

pub use mode::*;
pub use settings::*;
use thiserror::Error;

/// Errors raised while building the startup configuration.
///
/// Any of these is fatal: the process exits before serving requests.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("backend mode '{mode}' is not implemented, choose one of: {accepted}")]
    UnknownBackendMode { mode: String, accepted: String },

    #[error("no UI flavor for '{flavor}', choose one of: {accepted}")]
    UnknownUiFlavor { flavor: String, accepted: String },

    #[error("the user id header name must not be empty")]
    EmptyUseridHeader,
}
