//! Common error types for DNOTE

use thiserror::Error;

/// Common result type for DNOTE operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across DNOTE crates
///
/// Intake rejections are not errors of this kind: they are reported as
/// [`crate::intake::IntakeError`] inside an [`crate::intake::IntakeOutcome`].
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML file present but unparsable
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
