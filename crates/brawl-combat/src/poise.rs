//! Poise: a stagger-resistance pool separate from damage percent.
//!
//! Every hit drains poise by an effective damage value. While poise holds,
//! hits either armor through or cause a short flinch. Once it breaks the
//! fighter flinches, staggers or launches depending on how hard the breaking
//! hit was. Poise only refills after a quiet period with no hits, so it cannot
//! recover in the middle of a combo.

use brawl_common::FighterId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::config::PoiseConfig;
use crate::hitbox::Hitbox;

/// Poise pool of one fighter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiseState {
    /// Current poise, in `[0, max_poise]`
    pub current_poise: f32,
    /// Pool size
    pub max_poise: f32,
    /// Refill rate
    pub regen_rate: f32,
    /// Whether poise is broken
    pub is_staggered: bool,
    /// Frames of stagger remaining
    pub stagger_frames: u32,
    /// Clock time (ms) of the last hit taken
    pub last_hit_ms: Option<u64>,
}

impl PoiseState {
    /// Creates a full pool.
    #[must_use]
    pub fn new(max_poise: f32, regen_rate: f32) -> Self {
        Self {
            current_poise: max_poise,
            max_poise,
            regen_rate,
            is_staggered: false,
            stagger_frames: 0,
            last_hit_ms: None,
        }
    }

    /// Fraction of the pool remaining.
    #[must_use]
    pub fn ratio(&self) -> f32 {
        if self.max_poise <= 0.0 {
            0.0
        } else {
            self.current_poise / self.max_poise
        }
    }
}

/// How a fighter reacts to a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitReactionKind {
    /// Hit lands, defender keeps full control.
    SuperArmor,
    /// Brief interruption.
    Flinch,
    /// Poise broken, defender is helpless.
    Stagger,
    /// Poise broken by a heavy hit, defender is sent flying.
    Launch,
}

/// Outcome of a hit on a fighter's poise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitReaction {
    /// Reaction class
    pub kind: HitReactionKind,
    /// Frames the reaction lasts
    pub frames: u32,
    /// Whether the defender may move during it
    pub can_move: bool,
    /// Whether the defender may act during it
    pub can_act: bool,
}

impl Default for HitReaction {
    fn default() -> Self {
        Self {
            kind: HitReactionKind::Flinch,
            frames: 0,
            can_move: true,
            can_act: true,
        }
    }
}

impl HitReaction {
    fn super_armor() -> Self {
        Self {
            kind: HitReactionKind::SuperArmor,
            frames: 0,
            can_move: true,
            can_act: true,
        }
    }

    fn flinch(frames: u32) -> Self {
        Self {
            kind: HitReactionKind::Flinch,
            frames,
            can_move: true,
            can_act: false,
        }
    }

    fn helpless(kind: HitReactionKind, frames: u32) -> Self {
        Self {
            kind,
            frames,
            can_move: false,
            can_act: false,
        }
    }
}

/// Tracks poise for every fighter.
#[derive(Debug, Default)]
pub struct PoiseSystem {
    config: PoiseConfig,
    states: HashMap<FighterId, PoiseState>,
}

impl PoiseSystem {
    /// Creates a poise system.
    #[must_use]
    pub fn new(config: PoiseConfig) -> Self {
        Self {
            config,
            states: HashMap::new(),
        }
    }

    /// Sets up (or resets) a fighter's pool with explicit values.
    pub fn init_poise(&mut self, fighter: FighterId, max_poise: f32, regen_rate: f32) {
        self.states
            .insert(fighter, PoiseState::new(max_poise, regen_rate));
    }

    /// Refills a fighter's pool and clears stagger.
    pub fn reset_poise(&mut self, fighter: FighterId) {
        if let Some(state) = self.states.get_mut(&fighter) {
            *state = PoiseState::new(state.max_poise, state.regen_rate);
        }
    }

    /// Snapshot of a fighter's pool.
    #[must_use]
    pub fn get_poise_state(&self, fighter: FighterId) -> Option<PoiseState> {
        self.states.get(&fighter).cloned()
    }

    /// Poise damage a hitbox deals.
    #[must_use]
    pub fn effective_damage(&self, hitbox: &Hitbox, attacker_weight: f32) -> f32 {
        hitbox.damage
            * (1.0 + hitbox.knockback_growth / 100.0)
            * (attacker_weight / 100.0)
            * self.config.type_factors.get(hitbox.damage_type)
    }

    /// Drains poise for a hit and classifies the reaction.
    pub fn calculate_reaction(
        &mut self,
        fighter: FighterId,
        hitbox: &Hitbox,
        attacker_weight: f32,
        now_ms: u64,
    ) -> HitReaction {
        let effective = self.effective_damage(hitbox, attacker_weight);
        self.apply_effective_damage(fighter, effective, now_ms)
    }

    /// Drains an already computed effective damage and classifies the reaction.
    pub fn apply_effective_damage(
        &mut self,
        fighter: FighterId,
        effective: f32,
        now_ms: u64,
    ) -> HitReaction {
        debug_assert!(effective >= 0.0, "negative effective damage");
        let config = &self.config;
        let state = self.states.entry(fighter).or_insert_with(|| {
            PoiseState::new(config.default_max_poise, config.default_regen_rate)
        });

        state.current_poise = (state.current_poise - effective).max(0.0);
        state.last_hit_ms = Some(now_ms);

        if state.current_poise > 0.0 {
            if state.ratio() > config.super_armor_ratio && effective < config.flinch_threshold {
                return HitReaction::super_armor();
            }
            return HitReaction::flinch((effective * 0.3).floor() as u32);
        }

        let frames = (config.stagger_base_frames + (effective * 0.5).floor() as u32)
            .min(config.stagger_max_frames);
        state.is_staggered = true;
        state.stagger_frames = frames;
        debug!(%fighter, effective, frames, "poise broken");

        if effective >= config.launch_threshold {
            HitReaction::helpless(HitReactionKind::Launch, frames)
        } else if effective >= config.stagger_threshold {
            HitReaction::helpless(HitReactionKind::Stagger, frames)
        } else {
            HitReaction::flinch((effective * 0.5).floor() as u32)
        }
    }

    /// Refills pools of fighters that have not been hit for the regen delay.
    /// `delta_ms` is the tick length.
    pub fn update(&mut self, delta_ms: f32, now_ms: u64) {
        let delay = self.config.regen_delay_ms;
        for state in self.states.values_mut() {
            let quiet = state
                .last_hit_ms
                .map_or(true, |hit| now_ms.saturating_sub(hit) >= delay);
            if quiet && state.current_poise < state.max_poise {
                state.current_poise = (state.current_poise
                    + state.regen_rate * delta_ms * 0.06)
                    .min(state.max_poise);
            }
        }
    }

    /// Counts stagger down by one frame, clearing it when it runs out.
    pub fn tick_stagger(&mut self) {
        for (fighter, state) in &mut self.states {
            if !state.is_staggered {
                continue;
            }
            state.stagger_frames = state.stagger_frames.saturating_sub(1);
            if state.stagger_frames == 0 {
                state.is_staggered = false;
                trace!(%fighter, "stagger ended");
            }
        }
    }

    /// Forgets one fighter.
    pub fn remove(&mut self, fighter: FighterId) {
        self.states.remove(&fighter);
    }

    /// Forgets every fighter.
    pub fn clear(&mut self) {
        self.states.clear();
    }
}
