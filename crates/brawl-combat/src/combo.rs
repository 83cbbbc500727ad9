//! Combo tracking per attacker.

use brawl_common::FighterId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

use crate::config::ComboConfig;
use crate::engine::HitResult;

/// A running (or finished) combo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    /// Hits landed in this combo
    pub hits: u32,
    /// Damage dealt across the combo
    pub total_damage: f32,
    /// Clock time (ms) of the first hit
    pub start_ms: u64,
    /// Clock time (ms) of the latest hit
    pub last_hit_ms: u64,
    /// Combo multiplier
    pub multiplier: f32,
    /// Whether the combo is still running
    pub active: bool,
}

impl ComboState {
    fn first_hit(damage: f32, now_ms: u64) -> Self {
        Self {
            hits: 1,
            total_damage: damage,
            start_ms: now_ms,
            last_hit_ms: now_ms,
            multiplier: 1.0,
            active: true,
        }
    }

    /// Combo length in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.last_hit_ms.saturating_sub(self.start_ms)
    }
}

fn combo_multiplier(config: &ComboConfig, hits: u32) -> f32 {
    let extra = hits.saturating_sub(1) as f32;
    (1.0 + extra * config.scaling).min(config.max_multiplier)
}

#[derive(Debug, Default)]
struct ComboRecord {
    current: Option<ComboState>,
    best: Option<ComboState>,
}

/// Tracks combos for every attacker.
#[derive(Debug, Default)]
pub struct ComboSystem {
    config: ComboConfig,
    combos: HashMap<FighterId, ComboRecord>,
}

impl ComboSystem {
    /// Creates a combo system.
    #[must_use]
    pub fn new(config: ComboConfig) -> Self {
        Self {
            config,
            combos: HashMap::new(),
        }
    }

    fn is_stale(&self, combo: &ComboState, now_ms: u64) -> bool {
        now_ms.saturating_sub(combo.last_hit_ms) > self.config.reset_time_ms
    }

    /// Multiplier for a combo of `hits` hits.
    #[must_use]
    pub fn multiplier_for(&self, hits: u32) -> f32 {
        combo_multiplier(&self.config, hits)
    }

    /// Records a hit landed by `attacker` and returns the updated combo.
    pub fn record_hit(
        &mut self,
        attacker: FighterId,
        result: &HitResult,
        now_ms: u64,
    ) -> ComboState {
        self.expire(attacker, now_ms);

        let config = &self.config;
        let record = self.combos.entry(attacker).or_default();
        let combo = match record.current.as_mut() {
            Some(combo) => {
                combo.hits += 1;
                combo.total_damage += result.damage;
                combo.last_hit_ms = now_ms;
                combo.multiplier = combo_multiplier(config, combo.hits);
                combo.clone()
            },
            None => {
                let combo = ComboState::first_hit(result.damage, now_ms);
                record.current = Some(combo.clone());
                combo
            },
        };
        trace!(%attacker, hits = combo.hits, multiplier = combo.multiplier, "combo hit");
        combo
    }

    /// Closes a stale combo, moving it into the best slot if it beat it.
    fn expire(&mut self, attacker: FighterId, now_ms: u64) {
        let stale = self
            .combos
            .get(&attacker)
            .and_then(|r| r.current.as_ref())
            .is_some_and(|combo| self.is_stale(combo, now_ms));
        if stale {
            self.end_combo(attacker);
        }
    }

    /// Current combo as of `now_ms`. Stale combos are reset first.
    pub fn get_combo(&mut self, attacker: FighterId, now_ms: u64) -> Option<ComboState> {
        self.expire(attacker, now_ms);
        self.combos.get(&attacker)?.current.clone()
    }

    /// Ends the current combo and returns it.
    pub fn end_combo(&mut self, attacker: FighterId) -> Option<ComboState> {
        let record = self.combos.get_mut(&attacker)?;
        let mut finished = record.current.take()?;
        finished.active = false;
        let beats_best = record
            .best
            .as_ref()
            .map_or(true, |best| finished.hits > best.hits);
        if beats_best {
            record.best = Some(finished.clone());
        }
        Some(finished)
    }

    /// Longest finished combo by an attacker.
    #[must_use]
    pub fn best_combo(&self, attacker: FighterId) -> Option<ComboState> {
        self.combos.get(&attacker)?.best.clone()
    }

    /// Forgets one fighter.
    pub fn remove(&mut self, attacker: FighterId) {
        self.combos.remove(&attacker);
    }

    /// Forgets every fighter.
    pub fn clear(&mut self) {
        self.combos.clear();
    }
}
