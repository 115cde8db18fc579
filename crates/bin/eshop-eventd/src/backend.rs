//! Broker wiring: one transport per event stream, chosen by configuration.

use std::sync::Arc;

use eshop_adapter_amqp_lapin::{AmqpError, AmqpExchangeTransport, AmqpOrderQueueTransport};
use eshop_adapter_servicebus_reqwest::{ServiceBusError, ServiceBusTransport};
use eshop_app::ports::{MessageTransport, OutboundMessage};
use eshop_app::publisher::TransportPublisher;
use eshop_app::transport::NoopTransport;
use eshop_domain::error::PublishError;

use crate::config::{Backend, Config};

/// Any of the broker transports the daemon can be configured with.
pub enum BrokerTransport {
    AmqpExchange(AmqpExchangeTransport),
    AmqpQueue(AmqpOrderQueueTransport),
    ServiceBus(ServiceBusTransport),
    Noop(NoopTransport),
}

impl BrokerTransport {
    /// Release the underlying connection, if any.
    pub async fn close(&self) {
        match self {
            Self::AmqpExchange(transport) => transport.close().await,
            Self::AmqpQueue(transport) => transport.close().await,
            Self::ServiceBus(transport) => transport.close(),
            Self::Noop(_) => {}
        }
    }
}

impl MessageTransport for BrokerTransport {
    async fn send(&self, message: OutboundMessage) -> Result<(), PublishError> {
        match self {
            Self::AmqpExchange(transport) => transport.send(message).await,
            Self::AmqpQueue(transport) => transport.send(message).await,
            Self::ServiceBus(transport) => transport.send(message).await,
            Self::Noop(transport) => transport.send(message).await,
        }
    }
}

/// Publisher over a shared broker transport.
pub type BrokerPublisher = TransportPublisher<Arc<BrokerTransport>>;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("failed to open AMQP broker")]
    Amqp(#[from] AmqpError),
    #[error("failed to open service bus sender")]
    ServiceBus(#[from] ServiceBusError),
}

/// Close `opened` when a later step of the startup fails.
async fn or_close<T, E>(result: Result<T, E>, opened: &BrokerTransport) -> Result<T, E> {
    if result.is_err() {
        opened.close().await;
    }
    result
}

/// The transports of every event stream, opened once at startup.
///
/// Streams may share a transport: on AMQP, promotion events go through the
/// same exchange as every other event; on Service Bus, detailed order
/// snapshots go to the general events entity.
pub struct Backends {
    events: Arc<BrokerTransport>,
    promotions: Arc<BrokerTransport>,
    orders: Arc<BrokerTransport>,
}

impl Backends {
    /// Connect to the configured broker and declare its topology.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the broker cannot be reached or the
    /// topology cannot be declared.
    pub async fn open(config: &Config) -> Result<Self, BackendError> {
        match config.messaging.backend {
            Backend::Amqp => {
                let events = Arc::new(BrokerTransport::AmqpExchange(
                    AmqpExchangeTransport::connect(&config.amqp).await?,
                ));
                let orders = or_close(
                    AmqpOrderQueueTransport::connect(&config.amqp).await,
                    &events,
                )
                .await?;
                let orders = Arc::new(BrokerTransport::AmqpQueue(orders));
                Ok(Self {
                    promotions: Arc::clone(&events),
                    events,
                    orders,
                })
            }
            Backend::ServiceBus => {
                let events = Arc::new(BrokerTransport::ServiceBus(ServiceBusTransport::new(
                    &config.service_bus,
                )?));
                let promotions = Arc::new(BrokerTransport::ServiceBus(ServiceBusTransport::new(
                    &config.service_bus.clone().for_promotions(),
                )?));
                Ok(Self {
                    orders: Arc::clone(&events),
                    events,
                    promotions,
                })
            }
            Backend::None => Ok(Self::noop()),
        }
    }

    /// Every stream drops its events.
    #[must_use]
    pub fn noop() -> Self {
        let noop = Arc::new(BrokerTransport::Noop(NoopTransport));
        Self {
            events: Arc::clone(&noop),
            promotions: Arc::clone(&noop),
            orders: noop,
        }
    }

    /// Publisher for order completion and other general events.
    #[must_use]
    pub fn event_publisher(&self) -> BrokerPublisher {
        TransportPublisher::new(Arc::clone(&self.events))
    }

    /// Publisher for promotion started/ended events.
    #[must_use]
    pub fn promotion_publisher(&self) -> BrokerPublisher {
        TransportPublisher::new(Arc::clone(&self.promotions))
    }

    /// Publisher for detailed order snapshots.
    #[must_use]
    pub fn order_queue_publisher(&self) -> BrokerPublisher {
        TransportPublisher::new(Arc::clone(&self.orders))
    }

    /// Close every transport. Shared transports are closed once per stream,
    /// which the transports tolerate.
    pub async fn close(&self) {
        self.events.close().await;
        self.promotions.close().await;
        self.orders.close().await;
    }
}
