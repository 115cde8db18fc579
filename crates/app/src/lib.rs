//! # eshop-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `MessageTransport`: hand one serialized message to a broker
//!   - `PromotionRepository`, `OrderRepository`: persistence of the aggregates
//!   - `Clock`: the source of "now"
//! - Define the **publisher facade** (`EventPublisher` / `TransportPublisher`):
//!   serialize an integration event, address it by its event type, and send it
//!   through whichever transport was wired in
//! - Provide **in-process transports** that need no IO (no-op, broadcast)
//! - Orchestrate promotion and order use-cases, including the transition
//!   detection that decides when lifecycle events fire
//!
//! ## Dependency rule
//! Depends on `eshop-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod publisher;
pub mod services;
pub mod transport;
