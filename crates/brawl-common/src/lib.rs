//! # Brawl Common
//!
//! Common types and utilities shared by the Brawl crates.
//!
//! This crate provides:
//! - 2D vector algebra and angle conversions
//! - ID types (FighterId, HitboxId)
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod ids;
pub mod math;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::math::*;
}

pub use prelude::*;
