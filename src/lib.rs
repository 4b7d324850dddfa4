//! Async facade over device calendar stores.
//!
//! [`CalendarClient`] forwards every call to an injected
//! [`CalendarProvider`]. The crate ships one provider, the actor-backed
//! [`components::LocalStoreHandle`].

pub mod client;
pub mod components;
pub mod config;
pub mod error;
pub mod models;
pub mod provider;
pub mod utils;

pub use client::CalendarClient;
pub use error::{CalendarResult, Error};
pub use provider::CalendarProvider;
