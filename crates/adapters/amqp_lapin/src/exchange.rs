//! Topic-exchange transport: every event goes to one durable exchange,
//! routed by its event type.

use eshop_app::ports::{MessageTransport, OutboundMessage};
use eshop_domain::error::PublishError;
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions};
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties, ExchangeKind};

use crate::config::AmqpConfig;
use crate::error::AmqpError;
use crate::message;

const REPLY_SUCCESS: u16 = 200;

/// Publishes to a durable topic exchange through a single long-lived
/// confirm-mode channel.
///
/// The channel is shared by all concurrent publishers without a lock.
pub struct AmqpExchangeTransport {
    connection: Connection,
    channel: Channel,
    exchange: String,
}

impl AmqpExchangeTransport {
    /// Connect, open the channel and declare the exchange (durable, not
    /// auto-deleted, topic).
    ///
    /// # Errors
    ///
    /// Returns [`AmqpError::Connect`] if the broker is unreachable or refuses
    /// the credentials, [`AmqpError::Declare`] if the exchange exists with
    /// incompatible settings.
    #[tracing::instrument(skip_all, fields(host = %config.host, exchange = %config.exchange))]
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
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await
            .map_err(AmqpError::Connect)?;
        channel
            .exchange_declare(
                &config.exchange,
                ExchangeKind::Topic,
                message::exchange_declare_options(),
                FieldTable::default(),
            )
            .await
            .map_err(|source| AmqpError::Declare {
                kind: "exchange",
                name: config.exchange.clone(),
                source,
            })?;

        tracing::info!("connected to AMQP broker");
        Ok(Self {
            connection,
            channel,
            exchange: config.exchange.clone(),
        })
    }

    #[must_use]
    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    /// Close the channel, then the connection. Safe to call more than once.
    pub async fn close(&self) {
        if self.channel.status().connected() {
            if let Err(err) = self.channel.close(REPLY_SUCCESS, "OK").await {
                tracing::debug!(error = %err, "closing AMQP channel failed");
            }
        }
        if self.connection.status().connected() {
            if let Err(err) = self.connection.close(REPLY_SUCCESS, "OK").await {
                tracing::debug!(error = %err, "closing AMQP connection failed");
            }
        }
        tracing::info!(exchange = %self.exchange, "AMQP exchange transport closed");
    }

    async fn publish(&self, message: OutboundMessage) -> Result<(), AmqpError> {
        if !self.channel.status().connected() {
            return Err(AmqpError::ChannelClosed);
        }
        let route = message::exchange_route(&self.exchange, &message);
        let confirmation = self
            .channel
            .basic_publish(
                route.exchange,
                route.routing_key,
                BasicPublishOptions::default(),
                &message.body,
                message::properties(&message),
            )
            .await
            .map_err(AmqpError::Publish)?
            .await
            .map_err(AmqpError::Publish)?;
        message::check_confirmation(&confirmation, message.event_type)
    }
}

impl MessageTransport for AmqpExchangeTransport {
    async fn send(&self, message: OutboundMessage) -> Result<(), PublishError> {
        tracing::debug!(
            exchange = %self.exchange,
            routing_key = message.event_type,
            message_id = %message.message_id,
            "publishing to exchange"
        );
        self.publish(message).await.map_err(PublishError::from)
    }
}
