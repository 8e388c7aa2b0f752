//! Core types for Eventica.
//!
//! This crate holds everything the server and the CLI share:
//! - `Event` and the input/output shapes around it
//! - `datetime` for canonical date/time strings
//! - `ordering` for the newest-first and upcoming-first sort orders
//! - `search` for filtering listings by text
//! - `service` and `store` for validated, atomic persistence

pub mod audit;
pub mod config;
pub mod datetime;
pub mod error;
pub mod event;
pub mod ordering;
pub mod search;
pub mod service;
pub mod store;

pub use error::{EventicaError, EventicaResult};
pub use event::*;
