use thiserror::Error;

/// Result type alias for container operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the container.
///
/// All errors are returned synchronously to the caller of the failing
/// operation. Nothing is retried and no partial result is produced.
#[derive(Error, Debug)]
pub enum Error {
    /// An argument could not be used by the requested operation.
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A capability reference is not an interface.
    #[error("Not an interface: '{name}'")]
    InvalidCapability { name: &'static str },

    /// No implementation is registered for the capability.
    #[error("Interface '{name}' not registered.\n{registry}")]
    UnknownCapability { name: &'static str, registry: String },

    /// Single resolution was requested for a capability with several
    /// implementations.
    #[error("Multiple registrations ({count}) found for interface: {name}")]
    AmbiguousCapability { name: &'static str, count: usize },

    /// Manual singleton seeding cannot be applied to the type.
    #[error("Manual singleton injection failed for '{name}': {reason}")]
    SingletonConflict {
        name: &'static str,
        reason: &'static str,
    },

    /// A field carries import metadata the container cannot satisfy.
    #[error("Field '{owner}::{field}' cannot be populated by this container: {reason}")]
    UnwireableField {
        owner: &'static str,
        field: String,
        reason: &'static str,
    },

    /// The container has been disposed.
    #[error("Container is disposed")]
    Disposed,

    /// Configuration refers to a component missing from the catalog.
    #[error("Unknown component: '{name}'")]
    UnknownComponent { name: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON parsing error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl Error {
    pub(crate) fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub(crate) fn unwireable(owner: &'static str, field: &str, reason: &'static str) -> Self {
        Self::UnwireableField {
            owner,
            field: field.to_string(),
            reason,
        }
    }
}
