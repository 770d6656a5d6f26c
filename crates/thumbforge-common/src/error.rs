//! Common error types used throughout thumbforge.
//!
//! Every failure a thumbnail operation can surface maps to one variant here.
//! Errors are propagated unchanged to the caller; nothing in the core retries
//! or swallows them.

/// Common error type for thumbforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The manager is bound to an empty or unset source image.
    #[error("Invalid source: the thumbnail manager has no source image")]
    InvalidSource,

    /// The size name is not defined in configuration.
    #[error("Unknown size: {0}")]
    UnknownSize(String),

    /// Member-style access used a name that is neither a size nor an operation.
    #[error("Unknown member: {0}")]
    UnknownMember(String),

    /// A pipeline stage failed on the image data.
    #[error("Processing error: {0}")]
    Processing(String),

    /// A batch operation was requested against a backend without batch support.
    #[error("Unsupported backend: {0}")]
    UnsupportedBackend(String),

    /// A strict lookup found no thumbnail.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A metadata backend operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input was provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Create a new UnknownSize error.
    pub fn unknown_size<S: Into<String>>(size: S) -> Self {
        Self::UnknownSize(size.into())
    }

    /// Create a new UnknownMember error.
    pub fn unknown_member<S: Into<String>>(name: S) -> Self {
        Self::UnknownMember(name.into())
    }

    /// Create a new Processing error.
    pub fn processing<S: Into<String>>(msg: S) -> Self {
        Self::Processing(msg.into())
    }

    /// Create a new UnsupportedBackend error.
    pub fn unsupported_backend<S: Into<String>>(msg: S) -> Self {
        Self::UnsupportedBackend(msg.into())
    }

    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Database error.
    pub fn database<S: Into<String>>(msg: S) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new InvalidInput error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
