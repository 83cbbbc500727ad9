//! Knockback, hitstun and hitlag formulas.
//!
//! Knockback magnitude:
//!
//! ```text
//! percent = p/10 + p*d/20
//! weight  = 200 / (w + 100)
//! scaled  = percent * weight * 1.4 + 18
//! kb      = (scaled * s + b) * rage * base_multiplier
//! ```
//!
//! `p` is the defender's percent before the hit, `d` the hit's damage, `w` the
//! defender's weight, `s` the growth and `b` the base knockback.

use brawl_common::{deg_to_rad, signed_angle_between, Vec2};

use crate::config::KnockbackConfig;
use crate::fighter::Facing;

/// Inputs to the knockback magnitude formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnockbackInput {
    /// Defender percent before the hit
    pub defender_damage: f32,
    /// Damage of the hit
    pub damage: f32,
    /// Defender weight
    pub weight: f32,
    /// Knockback growth
    pub growth: f32,
    /// Base knockback
    pub base: f32,
    /// Attacker's own percent, drives rage
    pub attacker_damage: f32,
}

/// Pure knockback math over a coefficient table.
#[derive(Debug, Clone, Default)]
pub struct KnockbackCalculator {
    config: KnockbackConfig,
}

impl KnockbackCalculator {
    /// Creates a calculator.
    #[must_use]
    pub fn new(config: KnockbackConfig) -> Self {
        Self { config }
    }

    /// Coefficient table in use.
    #[must_use]
    pub fn config(&self) -> &KnockbackConfig {
        &self.config
    }

    /// Rage multiplier for an attacker at `attacker_damage` percent.
    #[must_use]
    pub fn rage_multiplier(&self, attacker_damage: f32) -> f32 {
        1.0 + (self.config.rage_max - 1.0) * (attacker_damage / 100.0).min(1.0)
    }

    /// Knockback magnitude.
    #[must_use]
    pub fn calculate(&self, input: &KnockbackInput) -> f32 {
        debug_assert!(input.weight >= 0.0, "negative weight");
        let p = input.defender_damage;
        let d = input.damage;
        let percent_term = p / 10.0 + (p * d) / 20.0;
        let weight_term = 200.0 / (input.weight + 100.0);
        let scaling_term = percent_term * weight_term * 1.4 + 18.0;
        (scaling_term * input.growth + input.base)
            * self.rage_multiplier(input.attacker_damage)
            * self.config.base_multiplier
    }

    /// Launch vector for a magnitude and angle. Left-facing attackers mirror
    /// the angle; up is negative Y.
    #[must_use]
    pub fn knockback_vector(&self, magnitude: f32, angle_deg: f32, facing: Facing) -> Vec2 {
        let angle = deg_to_rad(angle_deg);
        Vec2::new(
            facing.sign() * angle.cos() * magnitude,
            -angle.sin() * magnitude,
        )
    }

    /// Deflects knockback towards a held direction by at most the DI limit.
    /// Magnitude is unchanged; zero input returns the vector as is.
    #[must_use]
    pub fn apply_di(&self, knockback: Vec2, input: Vec2) -> Vec2 {
        let direction = input.normalized();
        if direction.is_zero() || knockback.is_zero() {
            return knockback;
        }
        let limit = deg_to_rad(self.config.di_strength);
        let delta = signed_angle_between(knockback, direction).clamp(-limit, limit)
            * self.config.di_multiplier;
        knockback.rotated(delta)
    }

    /// Hitstun frames for a knockback magnitude.
    #[must_use]
    pub fn hitstun(&self, knockback: f32) -> u32 {
        let frames = self.config.hitstun_base + knockback * self.config.hitstun_multiplier;
        frames.max(0.0).floor() as u32
    }

    /// Hitlag frames for a hit of `damage`.
    #[must_use]
    pub fn hitlag(&self, damage: f32, is_defender: bool) -> u32 {
        self.hitlag_with_minimum(damage, 0, is_defender)
    }

    /// Hitlag frames for a hit of `damage` whose hitbox authors at least
    /// `authored` frames. The defender factor and the cap apply after the
    /// authored floor.
    #[must_use]
    pub fn hitlag_with_minimum(&self, damage: f32, authored: u32, is_defender: bool) -> u32 {
        let computed = self.config.hitlag_base + damage * self.config.hitlag_multiplier;
        let mut frames = computed.max(authored as f32);
        if is_defender {
            frames *= self.config.defender_hitlag_factor;
        }
        (frames.max(0.0).floor() as u32).min(self.config.hitlag_max)
    }

    /// Whether the hit sends the defender into tumble.
    #[must_use]
    pub fn should_tumble(&self, knockback: f32, damage: f32) -> bool {
        knockback > self.config.tumble_knockback || damage > self.config.tumble_damage
    }

    /// Whether the hit launches the defender.
    #[must_use]
    pub fn should_launch(&self, knockback: f32, damage: f32) -> bool {
        knockback > self.config.launch_knockback && damage > self.config.launch_damage
    }
}
