//! Amazon Product Widget Core - Shared types library.
//!
//! This crate provides the types shared by the widget library and the CLI:
//! - `widget` - Signed Amazon requests, item cache, rendering
//! - `cli` - Command-line lookups, rendering and maintenance
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no storage.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Validated ASINs, product records and regional storefronts

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
