//! Transport port: the contract every broker adapter satisfies.

use std::future::Future;

use eshop_domain::error::PublishError;
use eshop_domain::event::{Envelope, IntegrationEvent, JSON_CONTENT_TYPE};
use eshop_domain::time::Timestamp;
use uuid::Uuid;

/// A serialized integration event, ready for a broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Unique per publish; lets brokers and consumers drop redeliveries.
    pub message_id: Uuid,
    /// Routing key on topic brokers, subject on managed brokers.
    pub event_type: &'static str,
    pub content_type: &'static str,
    pub occurred_utc: Timestamp,
    /// UTF-8 JSON body.
    pub body: Vec<u8>,
}

impl OutboundMessage {
    /// Serialize `event` inside its envelope using its concrete shape.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::SerializationFailure`] if serialization fails.
    pub fn from_event<E: IntegrationEvent>(event: &E) -> Result<Self, PublishError> {
        let body = Envelope::new(event).to_json()?;
        Ok(Self {
            message_id: Uuid::new_v4(),
            event_type: event.event_type(),
            content_type: JSON_CONTENT_TYPE,
            occurred_utc: event.occurred_utc(),
            body,
        })
    }
}

/// Hands one message to a broker and resolves once the broker accepted it
/// or the send failed.
pub trait MessageTransport {
    fn send(&self, message: OutboundMessage)
    -> impl Future<Output = Result<(), PublishError>> + Send;
}

impl<T: MessageTransport + Send + Sync> MessageTransport for std::sync::Arc<T> {
    fn send(
        &self,
        message: OutboundMessage,
    ) -> impl Future<Output = Result<(), PublishError>> + Send {
        (**self).send(message)
    }
}
