//! Framework error type.
//!
//! Sub-crates define their own error enums (`NetworkError`, `DispatchError`,
//! `IoError`) and keep `FleetError` for configuration problems shared by
//! all of them.

use thiserror::Error;

/// The top-level error type for `fl-core`.
#[derive(Debug, Error)]
pub enum FleetError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `fl-core`.
pub type FleetResult<T> = Result<T, FleetError>;
