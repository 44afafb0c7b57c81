//! Use-case services over the entity readers.
//!
//! # Responsibility
//! - Compose task queries into the app's sidebar lists.
//! - Offer uuid lookup, search and `things:///` links.

pub mod lookup;
pub mod views;
