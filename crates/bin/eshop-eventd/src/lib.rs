//! # eshop-eventd: event publishing daemon
//!
//! Composition root for the integration event publishing subsystem.
//!
//! ## Responsibilities
//! - Load configuration (`eshop.toml`, `ESHOP_*` environment overrides)
//! - Open the configured broker once at startup and declare its topology
//! - Hand out one publisher per event stream (general events, promotion
//!   lifecycle events, detailed order snapshots)
//! - Release broker connections on shutdown
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

pub mod backend;
pub mod config;
