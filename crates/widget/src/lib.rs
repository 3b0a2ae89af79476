//! Amazon product widget library.
//!
//! Renders a randomly chosen Amazon product from a configured list of ASINs.
//! Product data comes from signed Product Advertising API lookups and is
//! cached in a persistent option store.
//!
//! # Modules
//!
//! - [`amazon`] - request signing, HTTP client, response mapping
//! - [`cache`] - lazily hydrated item cache with single-flight misses
//! - [`store`] - key-value option storage (memory, file, `PostgreSQL`)
//! - [`template`] - `[[TOKEN]]` placeholder substitution
//! - [`widget`] - widget settings and HTML rendering
//! - [`validation`] - credential checks against the live API
//! - [`config`] - environment configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod amazon;
pub mod cache;
pub mod config;
pub mod error;
pub mod store;
pub mod template;
pub mod validation;
pub mod widget;

pub use error::{Error, Result};
