//! Core types for the Amazon product widget.
//!
//! This module provides type-safe wrappers for the widget's domain concepts.

pub mod asin;
pub mod marketplace;
pub mod product;

pub use asin::{Asin, AsinError};
pub use marketplace::{MARKETPLACES, Marketplace};
pub use product::{IMAGE_SIZES, ImageVariant, ProductRecord};
