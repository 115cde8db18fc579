//! # eshop-domain
//!
//! Pure domain model for the eshop integration-event subsystem.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the **event catalog** (`OrderCompletedEvent`, `PromotionStartedEvent`,
//!   `PromotionEndedEvent`, `OrderCompletedDetailed`) and the
//!   [`IntegrationEvent`](event::IntegrationEvent) contract
//! - Define **Promotions** (time-windowed discounts) and the transition detector
//!   that decides when a promotion starts or ends
//! - Define **Orders** and the fold into a denormalized completion snapshot
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod event;
pub mod order;
pub mod promotion;
pub mod transition;
