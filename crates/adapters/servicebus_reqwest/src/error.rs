//! Service Bus adapter error types.

use eshop_domain::error::PublishError;

use crate::connection_string::ConnectionStringError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceBusError {
    #[error("invalid connection string")]
    ConnectionString(#[from] ConnectionStringError),

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("failed to encode broker properties")]
    Encode(#[from] serde_json::Error),

    #[error("request to service bus failed")]
    Request(#[source] reqwest::Error),

    /// Any non-2xx answer, including throttling and missing entities.
    #[error("service bus rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("sender is closed")]
    Closed,
}

impl From<ServiceBusError> for PublishError {
    fn from(err: ServiceBusError) -> Self {
        PublishError::transport(err)
    }
}
