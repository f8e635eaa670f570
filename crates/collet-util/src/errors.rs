use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all collet operations.
#[derive(Debug, Error, Diagnostic)]
pub enum CollectError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid requirements file or malformed requirement string.
    #[error("Requirement error: {message}")]
    #[diagnostic(help("Check collections.toml: names are `namespace.name`, versions like `>=1.0.0,<2.0.0`"))]
    Requirement { message: String },

    /// Global configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// No combination of collection versions satisfies the requirements.
    ///
    /// The message carries the full chain of conflicting requirements.
    #[error("Dependency resolution failed: {message}")]
    #[diagnostic(help("Relax one of the conflicting requirements listed above"))]
    Resolution { message: String },

    /// Registry metadata was missing, unreadable or malformed.
    #[error("Metadata error: {message}")]
    Metadata { message: String },

    /// Network request or download failed.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Lockfile could not be read, parsed or written.
    #[error("Lockfile error: {message}")]
    Lockfile { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type CollectResult<T> = miette::Result<T>;
