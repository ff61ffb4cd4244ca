//! Core domain + application logic for the team bot's admin broadcast module.
//!
//! This crate is intentionally framework-agnostic. Telegram and the persistent
//! user/organization store live behind ports (traits) implemented in adapter
//! crates; the conversation flow, recipient resolution, dispatch loop and
//! report formatting all live here.

pub mod broadcast;
pub mod config;
pub mod directory;
pub mod domain;
pub mod errors;
pub mod formatting;
pub mod logging;
pub mod messaging;

pub use errors::{Error, Result};
