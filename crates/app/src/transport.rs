//! In-process transports that need no broker.

use std::future::Future;

use eshop_domain::error::PublishError;
use tokio::sync::broadcast;

use crate::ports::{MessageTransport, OutboundMessage};

/// Transport for environments without a configured broker.
///
/// Every send succeeds and performs no IO, so callers can publish
/// unconditionally.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTransport;

impl MessageTransport for NoopTransport {
    fn send(
        &self,
        message: OutboundMessage,
    ) -> impl Future<Output = Result<(), PublishError>> + Send {
        tracing::debug!(event_type = message.event_type, "messaging disabled, dropping event");
        async { Ok(()) }
    }
}

/// In-process transport using a tokio [`broadcast`] channel.
///
/// Sending succeeds even when there are no active subscribers
/// (the message is simply dropped).
#[derive(Debug)]
pub struct InProcessTransport {
    sender: broadcast::Sender<OutboundMessage>,
}

impl InProcessTransport {
    /// Create a new transport with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to messages sent *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<OutboundMessage> {
        self.sender.subscribe()
    }
}

impl MessageTransport for InProcessTransport {
    fn send(
        &self,
        message: OutboundMessage,
    ) -> impl Future<Output = Result<(), PublishError>> + Send {
        // broadcast::send fails only when there are zero receivers.
        let _ = self.sender.send(message);
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn message(event_type: &'static str) -> OutboundMessage {
        OutboundMessage {
            message_id: Uuid::new_v4(),
            event_type,
            content_type: "application/json",
            occurred_utc: Utc::now(),
            body: b"{}".to_vec(),
        }
    }

    #[tokio::test]
    async fn should_deliver_message_to_multiple_subscribers() {
        let transport = InProcessTransport::new(16);
        let mut rx1 = transport.subscribe();
        let mut rx2 = transport.subscribe();

        let sent = message("PromotionStartedEvent");
        transport.send(sent.clone()).await.unwrap();

        assert_eq!(rx1.recv().await.unwrap(), sent);
        assert_eq!(rx2.recv().await.unwrap(), sent);
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let transport = InProcessTransport::new(16);
        assert!(transport.send(message("X")).await.is_ok());
    }

    #[tokio::test]
    async fn should_not_deliver_messages_sent_before_subscription() {
        let transport = InProcessTransport::new(16);
        transport.send(message("Early")).await.unwrap();

        let mut rx = transport.subscribe();
        transport.send(message("Late")).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().event_type, "Late");
    }

    #[tokio::test]
    async fn should_always_succeed_through_noop() {
        assert!(NoopTransport.send(message("X")).await.is_ok());
    }
}
