//! # eshop-adapter-servicebus-reqwest
//!
//! Managed queue/topic backend for Azure Service Bus.
//!
//! Messages are sent with the Service Bus REST API
//! (`POST {namespace}/{entity}/messages`) authenticated by a shared access
//! signature derived from the namespace connection string. The event type
//! travels as the message label (subject) so subscriptions can filter on it.
//!
//! No topology is declared: the queue or topic must already exist.
//!
//! ## Dependency rule
//! Same as other adapters: depends on `eshop-app` and `eshop-domain`.

mod config;
mod connection_string;
mod error;
mod sas;
mod transport;

pub use config::{DEFAULT_EVENTS_ENTITY, PROMOTION_EVENTS_ENTITY, ServiceBusConfig};
pub use connection_string::{ConnectionString, ConnectionStringError};
pub use error::ServiceBusError;
pub use transport::ServiceBusTransport;
