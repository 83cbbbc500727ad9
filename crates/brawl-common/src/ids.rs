//! ID types for fighters and collision volumes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for hitbox IDs.
static HITBOX_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifier of a fighter taking part in a match.
///
/// Fighters are created by the simulation loop, which picks the raw value.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct FighterId(u32);

impl FighterId {
    /// Creates a fighter ID from a raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FighterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.0)
    }
}

/// Unique identifier for a hitbox, hurtbox, grabbox or projectile volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HitboxId(u64);

impl HitboxId {
    /// Creates a new unique hitbox ID.
    #[must_use]
    pub fn new() -> Self {
        Self(HITBOX_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Creates a hitbox ID from a raw value (for deserialization).
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl Default for HitboxId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HitboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.0)
    }
}
