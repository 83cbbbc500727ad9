//! Damage application and per-fighter damage history.
//!
//! This module provides:
//! - Damage type multipliers
//! - Counter and parry damage scaling
//! - Clamped accumulation of damage percent
//! - A bounded history of recent hits per fighter

use brawl_common::FighterId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use crate::config::{CounterConfig, DamageConfig};
use crate::hitbox::{DamageType, Hitbox};

/// One entry in a fighter's damage history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageRecord {
    /// Damage taken
    pub amount: f32,
    /// Type of the hit
    pub damage_type: DamageType,
    /// Engine frame the hit landed on
    pub frame: u64,
}

/// Computes and applies damage.
///
/// History is kept for staleness rules layered on later; the current formulas
/// do not read it.
#[derive(Debug, Default)]
pub struct DamageSystem {
    config: DamageConfig,
    history: HashMap<FighterId, VecDeque<DamageRecord>>,
}

impl DamageSystem {
    /// Creates a damage system.
    #[must_use]
    pub fn new(config: DamageConfig) -> Self {
        Self {
            config,
            history: HashMap::new(),
        }
    }

    /// Multiplier for a damage type.
    #[must_use]
    pub fn type_multiplier(&self, damage_type: DamageType) -> f32 {
        self.config.type_multipliers.get(damage_type)
    }

    /// Damage of a hitbox after its type multiplier.
    #[must_use]
    pub fn calculate_damage(&self, hitbox: &Hitbox) -> f32 {
        debug_assert!(hitbox.damage >= 0.0, "negative hitbox damage");
        hitbox.damage * self.type_multiplier(hitbox.damage_type)
    }

    /// Damage dealt by a counter hit.
    #[must_use]
    pub fn counter_damage(&self, base: f32, counter: &CounterConfig) -> f32 {
        base * counter.counter_multiplier
    }

    /// Damage reflected by a parry.
    #[must_use]
    pub fn parry_damage(&self, base: f32, counter: &CounterConfig) -> f32 {
        base * counter.parry_multiplier
    }

    /// New damage percent after a hit, clamped to the global cap.
    #[must_use]
    pub fn apply_damage(&self, current: f32, incoming: f32) -> f32 {
        debug_assert!(incoming >= 0.0, "negative incoming damage");
        (current + incoming).min(self.config.max_damage)
    }

    /// Appends to a fighter's history, dropping the oldest entry past the limit.
    pub fn record(&mut self, fighter: FighterId, record: DamageRecord) {
        let limit = self.config.history_len;
        let entries = self.history.entry(fighter).or_default();
        entries.push_back(record);
        while entries.len() > limit {
            entries.pop_front();
        }
    }

    /// Recent hits taken by a fighter, oldest first.
    #[must_use]
    pub fn recent_damage(&self, fighter: FighterId) -> Vec<DamageRecord> {
        self.history
            .get(&fighter)
            .map(|entries| entries.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Forgets one fighter.
    pub fn remove(&mut self, fighter: FighterId) {
        self.history.remove(&fighter);
    }

    /// Forgets every fighter.
    pub fn clear(&mut self) {
        self.history.clear();
    }
}
