//! Core types for Golden Market.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod coins;
pub mod id;
pub mod order_number;
pub mod status;

pub use coins::Coins;
pub use id::*;
pub use order_number::OrderNumber;
pub use status::*;
