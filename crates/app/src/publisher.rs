//! Publisher facade: turns an integration event into an [`OutboundMessage`]
//! addressed by its event type and sends it through a [`MessageTransport`].

use eshop_domain::error::PublishError;
use eshop_domain::event::IntegrationEvent;
use tokio_util::sync::CancellationToken;

use crate::ports::{EventPublisher, MessageTransport, OutboundMessage};

/// [`EventPublisher`] backed by any [`MessageTransport`].
///
/// The transport is shared by every concurrent publish; no additional
/// locking happens here.
#[derive(Debug, Clone)]
pub struct TransportPublisher<T> {
    transport: T,
}

impl<T> TransportPublisher<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Borrow the transport, e.g. to close it on shutdown.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn into_transport(self) -> T {
        self.transport
    }
}

impl<T: MessageTransport + Sync> EventPublisher for TransportPublisher<T> {
    async fn publish<E: IntegrationEvent>(
        &self,
        event: &E,
        cancel: &CancellationToken,
    ) -> Result<(), PublishError> {
        if cancel.is_cancelled() {
            return Err(PublishError::Cancelled);
        }

        let message = OutboundMessage::from_event(event)?;
        let event_type = message.event_type;
        let message_id = message.message_id;

        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(PublishError::Cancelled),
            result = self.transport.send(message) => result,
        };

        match &result {
            Ok(()) => {
                tracing::info!(event_type, %message_id, "published integration event");
            }
            Err(err) => {
                tracing::warn!(event_type, %message_id, error = %err, "failed to publish integration event");
            }
        }
        result
    }
}
