//! Mapping of an [`OutboundMessage`] onto AMQP addressing and basic
//! properties.

use eshop_app::ports::OutboundMessage;
use lapin::BasicProperties;
use lapin::options::{ExchangeDeclareOptions, QueueDeclareOptions};
use lapin::publisher_confirm::Confirmation;

use crate::error::AmqpError;

/// `delivery_mode = 2`: the broker writes the message to disk.
pub(crate) const PERSISTENT: u8 = 2;

/// The nameless default exchange routes by queue name.
pub(crate) const DEFAULT_EXCHANGE: &str = "";

/// Where a single `basic_publish` goes.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Route<'a> {
    pub exchange: &'a str,
    pub routing_key: &'a str,
}

/// Events on the topic exchange are routed by their event type.
pub(crate) fn exchange_route<'a>(exchange: &'a str, message: &OutboundMessage) -> Route<'a> {
    Route {
        exchange,
        routing_key: message.event_type,
    }
}

/// Direct queue sends go through the default exchange keyed by queue name.
pub(crate) fn queue_route(queue: &str) -> Route<'_> {
    Route {
        exchange: DEFAULT_EXCHANGE,
        routing_key: queue,
    }
}

pub(crate) fn exchange_declare_options() -> ExchangeDeclareOptions {
    ExchangeDeclareOptions {
        durable: true,
        auto_delete: false,
        ..ExchangeDeclareOptions::default()
    }
}

pub(crate) fn queue_declare_options() -> QueueDeclareOptions {
    QueueDeclareOptions {
        durable: true,
        exclusive: false,
        auto_delete: false,
        ..QueueDeclareOptions::default()
    }
}

pub(crate) fn properties(message: &OutboundMessage) -> BasicProperties {
    let timestamp = u64::try_from(message.occurred_utc.timestamp()).unwrap_or_default();
    BasicProperties::default()
        .with_content_type(message.content_type.into())
        .with_delivery_mode(PERSISTENT)
        .with_message_id(message.message_id.to_string().into())
        .with_kind(message.event_type.into())
        .with_timestamp(timestamp)
}

pub(crate) fn check_confirmation(
    confirmation: &Confirmation,
    event_type: &'static str,
) -> Result<(), AmqpError> {
    if confirmation.is_nack() {
        return Err(AmqpError::Nacked { event_type });
    }
    Ok(())
}
