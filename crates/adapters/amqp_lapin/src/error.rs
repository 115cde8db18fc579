//! AMQP adapter error types.

use eshop_domain::error::PublishError;

/// Errors specific to the AMQP adapter.
#[derive(Debug, thiserror::Error)]
pub enum AmqpError {
    /// Opening the connection or a channel failed.
    #[error("failed to connect to AMQP broker")]
    Connect(#[source] lapin::Error),

    /// Declaring the exchange or queue failed.
    #[error("failed to declare {kind} {name:?}")]
    Declare {
        kind: &'static str,
        name: String,
        #[source]
        source: lapin::Error,
    },

    /// The connection or channel is no longer open.
    #[error("AMQP channel is not open")]
    ChannelClosed,

    /// `basic.publish` or its confirmation failed.
    #[error("AMQP publish failed")]
    Publish(#[source] lapin::Error),

    /// The broker negatively acknowledged the message.
    #[error("broker rejected {event_type} message")]
    Nacked { event_type: &'static str },
}

impl From<AmqpError> for PublishError {
    fn from(err: AmqpError) -> Self {
        PublishError::transport(err)
    }
}
