//! Direct-queue transport for detailed order-completed messages.

use eshop_app::ports::{MessageTransport, OutboundMessage};
use eshop_domain::error::PublishError;
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions};
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties};

use crate::config::AmqpConfig;
use crate::error::AmqpError;
use crate::message;

const REPLY_SUCCESS: u16 = 200;

/// Declare `queue` as durable, shared and kept when unused. Idempotent on the
/// broker side.
async fn declare_queue(channel: &Channel, queue: &str) -> Result<(), AmqpError> {
    channel
        .queue_declare(
            queue,
            message::queue_declare_options(),
            FieldTable::default(),
        )
        .await
        .map_err(|source| AmqpError::Declare {
            kind: "queue",
            name: queue.to_string(),
            source,
        })?;
    Ok(())
}

async fn close_channel(channel: &Channel) {
    if channel.status().connected() {
        if let Err(err) = channel.close(REPLY_SUCCESS, "OK").await {
            tracing::debug!(error = %err, "closing AMQP channel failed");
        }
    }
}

/// Sends each message straight to a durable queue.
///
/// Holds only the connection. Every send opens its own channel, declares the
/// queue (idempotent), publishes and closes the channel again.
pub struct AmqpOrderQueueTransport {
    connection: Connection,
    queue: String,
}

impl AmqpOrderQueueTransport {
    /// Connect and declare the queue once on a short-lived channel.
    ///
    /// # Errors
    ///
    /// Returns [`AmqpError::Connect`] if the broker is unreachable,
    /// [`AmqpError::Declare`] if the queue exists with incompatible settings.
    #[tracing::instrument(skip_all, fields(host = %config.host, queue = %config.order_queue))]
    pub async fn connect(config: &AmqpConfig) -> Result<Self, AmqpError> {
        let properties =
            ConnectionProperties::default().with_connection_name(config.connection_name.clone().into());
        let connection = Connection::connect(&config.uri(), properties)
            .await
            .map_err(AmqpError::Connect)?;
        let channel = connection
            .create_channel()
            .await
            .map_err(AmqpError::Connect)?;
        let declared = declare_queue(&channel, &config.order_queue).await;
        close_channel(&channel).await;
        if let Err(err) = declared {
            if let Err(close_err) = connection.close(REPLY_SUCCESS, "OK").await {
                tracing::debug!(error = %close_err, "closing AMQP connection failed");
            }
            return Err(err);
        }
        tracing::info!("connected to AMQP broker");
        Ok(Self {
            connection,
            queue: config.order_queue.clone(),
        })
    }

    #[must_use]
    pub fn queue(&self) -> &str {
        &self.queue
    }

    pub async fn close(&self) {
        if self.connection.status().connected() {
            if let Err(err) = self.connection.close(REPLY_SUCCESS, "OK").await {
                tracing::debug!(error = %err, "closing AMQP connection failed");
            }
        }
        tracing::info!(queue = %self.queue, "AMQP order queue transport closed");
    }

    async fn publish(&self, message: OutboundMessage) -> Result<(), AmqpError> {
        if !self.connection.status().connected() {
            return Err(AmqpError::ChannelClosed);
        }
        let channel = self
            .connection
            .create_channel()
            .await
            .map_err(AmqpError::Connect)?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(AmqpError::Connect)?;
        declare_queue(&channel, &self.queue).await?;

        let route = message::queue_route(&self.queue);
        let outcome = match channel
            .basic_publish(
                route.exchange,
                route.routing_key,
                BasicPublishOptions::default(),
                &message.body,
                message::properties(&message),
            )
            .await
        {
            Ok(confirm) => match confirm.await {
                Ok(confirmation) => message::check_confirmation(&confirmation, message.event_type),
                Err(err) => Err(AmqpError::Publish(err)),
            },
            Err(err) => Err(AmqpError::Publish(err)),
        };

        close_channel(&channel).await;
        outcome
    }
}

impl MessageTransport for AmqpOrderQueueTransport {
    async fn send(&self, message: OutboundMessage) -> Result<(), PublishError> {
        tracing::debug!(
            queue = %self.queue,
            message_id = %message.message_id,
            "publishing to queue"
        );
        self.publish(message).await.map_err(PublishError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn should_fail_to_connect_when_broker_unreachable() {
        let config = AmqpConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            ..AmqpConfig::default()
        };
        let result = AmqpOrderQueueTransport::connect(&config).await;
        assert!(matches!(result, Err(AmqpError::Connect(_))));
    }
}
