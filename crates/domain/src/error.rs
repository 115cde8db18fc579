//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`EshopError`]
//! (or [`PublishError`] on the messaging path) via `From`.

/// Boxed error used to carry adapter-specific failures across port boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error returned by application services.
#[derive(Debug, thiserror::Error)]
pub enum EshopError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The requested aggregate does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The persistence layer failed.
    #[error("storage error")]
    Storage(#[source] BoxError),

    /// An integration event could not be published.
    #[error("publish error")]
    Publish(#[from] PublishError),
}

/// Domain invariant violations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("discount must be between 0 and 100")]
    DiscountOutOfRange,

    #[error("end date must not precede start date")]
    InvalidWindow,

    #[error("quantity must be positive")]
    NonPositiveQuantity,

    #[error("order is already {0}")]
    OrderNotPending(&'static str),
}

/// An aggregate looked up by id was missing.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Failure taxonomy of the publish path.
///
/// No variant is retried by the publishing side; retry and redelivery are
/// left to the broker and to operations.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// The connection, channel or sender is not open, or the broker rejected
    /// the message.
    #[error("transport unavailable")]
    TransportUnavailable(#[source] BoxError),

    /// The payload could not be converted to its wire format.
    #[error("failed to serialize event")]
    SerializationFailure(#[from] serde_json::Error),

    /// The caller cancelled before the broker acknowledged the send.
    #[error("publish cancelled")]
    Cancelled,
}

impl PublishError {
    /// Wrap any adapter error as [`PublishError::TransportUnavailable`].
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::TransportUnavailable(err.into())
    }
}
