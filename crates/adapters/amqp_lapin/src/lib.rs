//! # eshop-adapter-amqp-lapin
//!
//! AMQP 0-9-1 broker adapter built on [lapin](https://docs.rs/lapin).
//!
//! ## Transports
//! - [`AmqpExchangeTransport`]: one connection and one confirm-mode channel,
//!   opened at startup. Declares a durable topic exchange and publishes each
//!   event with its event type as the routing key, so consumers bind per
//!   event family with wildcard patterns.
//! - [`AmqpOrderQueueTransport`]: one connection; every send opens a
//!   short-lived channel, re-declares the durable queue and publishes through
//!   the default exchange with the queue name as routing key.
//!
//! Both mark messages persistent and wait for the broker's publisher
//! confirm before reporting success.
//!
//! ## Dependency rule
//! Same as other adapters: depends on `eshop-app` and `eshop-domain`.

mod config;
mod error;
mod exchange;
mod message;
mod order_queue;

pub use config::AmqpConfig;
pub use error::AmqpError;
pub use exchange::AmqpExchangeTransport;
pub use order_queue::AmqpOrderQueueTransport;
