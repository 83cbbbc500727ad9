//! Fighter snapshots handed to the combat core by the simulation loop.
//!
//! The core reads these and writes back only `stats.current_damage`.

use brawl_common::{FighterId, Vec2};
use serde::{Deserialize, Serialize};

use crate::hitbox::{Hitbox, HitboxKind};

/// Direction a fighter is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Facing -X
    Left,
    /// Facing +X
    #[default]
    Right,
}

impl Facing {
    /// Unit X sign for this facing.
    #[must_use]
    pub const fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    /// The opposite facing.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Combat-relevant numbers for a fighter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FighterStats {
    /// Heavier fighters take less knockback.
    pub weight: f32,
    /// Accumulated damage percent.
    pub current_damage: f32,
    /// Cap on accumulated damage.
    pub max_damage: f32,
    /// Stocks remaining.
    pub lives: u32,
}

impl Default for FighterStats {
    fn default() -> Self {
        Self {
            weight: 100.0,
            current_damage: 0.0,
            max_damage: 999.0,
            lives: 3,
        }
    }
}

impl FighterStats {
    /// Fraction of health left, 1.0 at zero damage.
    #[must_use]
    pub fn health_fraction(&self) -> f32 {
        if self.max_damage <= 0.0 {
            return 0.0;
        }
        (1.0 - self.current_damage / self.max_damage).clamp(0.0, 1.0)
    }
}

/// Physics state owned by the simulation loop.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RigidBody {
    /// Current velocity
    pub velocity: Vec2,
    /// Whether the fighter stands on ground
    pub is_grounded: bool,
}

/// A fighter as seen by the combat core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    /// Fighter ID
    pub id: FighterId,
    /// Team index; fighters on the same team are allies
    pub team: u8,
    /// Facing direction
    pub facing: Facing,
    /// World position
    pub position: Vec2,
    /// Combat stats
    pub stats: FighterStats,
    /// Physics state
    pub body: RigidBody,
    /// Collision volumes, in priority order
    pub hitboxes: Vec<Hitbox>,
}

impl Fighter {
    /// Creates a fighter with default stats at a position.
    #[must_use]
    pub fn new(id: FighterId, team: u8, position: Vec2) -> Self {
        Self {
            id,
            team,
            facing: Facing::Right,
            position,
            stats: FighterStats::default(),
            body: RigidBody::default(),
            hitboxes: Vec::new(),
        }
    }

    /// Set facing.
    #[must_use]
    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    /// Set weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.stats.weight = weight;
        self
    }

    /// Set accumulated damage.
    #[must_use]
    pub fn with_damage(mut self, damage: f32) -> Self {
        self.stats.current_damage = damage;
        self
    }

    /// Add a collision volume owned by this fighter.
    #[must_use]
    pub fn with_hitbox(mut self, mut hitbox: Hitbox) -> Self {
        hitbox.owner = self.id;
        self.hitboxes.push(hitbox);
        self
    }

    /// Active volumes of one role, in stored order.
    pub fn active_boxes(&self, kind: HitboxKind) -> impl Iterator<Item = &Hitbox> + Clone {
        self.hitboxes
            .iter()
            .filter(move |h| h.active && h.kind == kind)
    }

    /// Checks whether another fighter is an ally.
    #[must_use]
    pub fn is_ally_of(&self, other: &Fighter) -> bool {
        self.id != other.id && self.team == other.team
    }

    /// Checks whether another fighter is an opponent.
    #[must_use]
    pub fn is_opponent_of(&self, other: &Fighter) -> bool {
        self.team != other.team
    }
}
