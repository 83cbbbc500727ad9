//! Combat engine: owns every subsystem and resolves hits.
//!
//! The engine is driven by an external fixed-tick loop. Each tick calls
//! [`CombatEngine::update`] first, which advances the frame counter and the
//! simulated clock and expires stale windows, and then resolves attacks with
//! [`CombatEngine::process_attack`].
//!
//! Hit resolution always runs in the same order:
//!
//! 1. parry check on the defender (a parry swaps the roles)
//! 2. counter check on the attacker
//! 3. poise reaction
//! 4. damage
//! 5. knockback
//! 6. combo record

use brawl_common::{FighterId, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::combo::{ComboState, ComboSystem};
use crate::config::CombatConfig;
use crate::counter::{CounterSystem, DefenseWindows};
use crate::damage::{DamageRecord, DamageSystem};
use crate::fighter::Fighter;
use crate::hitbox::{first_collision, DamageType, Hitbox, HitboxKind, HitboxRegistry};
use crate::knockback::{KnockbackCalculator, KnockbackInput};
use crate::poise::{HitReaction, PoiseState, PoiseSystem};

/// A resolved hit. Produced once per confirmed collision.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HitResult {
    /// Fighter dealing the damage (the parrying fighter after a parry)
    pub attacker: FighterId,
    /// Fighter taking the damage
    pub defender: FighterId,
    /// Final damage
    pub damage: f32,
    /// Launch vector, up is negative Y
    pub knockback: Vec2,
    /// Frames the defender cannot act
    pub hitstun: u32,
    /// Freeze frames for the attacker
    pub hitlag: u32,
    /// Freeze frames for the defender
    pub defender_hitlag: u32,
    /// Center of the overlap between the colliding boxes
    pub position: Vec2,
    /// Damage type of the hitbox
    pub damage_type: DamageType,
    /// Whether the hit landed inside the attacker's counter window
    pub was_counter: bool,
    /// Whether the defender parried, reflecting the hit
    pub was_parry: bool,
    /// Poise reaction of the defender
    pub reaction: HitReaction,
    /// Whether the defender should tumble
    pub tumble: bool,
    /// Whether the defender is launched
    pub launch: bool,
}

/// Resolves hits between fighters.
#[derive(Debug, Default)]
pub struct CombatEngine {
    config: CombatConfig,
    registry: HitboxRegistry,
    damage: DamageSystem,
    knockback: KnockbackCalculator,
    poise: PoiseSystem,
    counters: CounterSystem,
    combos: ComboSystem,
    frame: u64,
    elapsed_ms: f64,
}

impl CombatEngine {
    /// Creates an engine from a balance table.
    #[must_use]
    pub fn new(config: CombatConfig) -> Self {
        Self {
            registry: HitboxRegistry::new(),
            damage: DamageSystem::new(config.damage.clone()),
            knockback: KnockbackCalculator::new(config.knockback.clone()),
            poise: PoiseSystem::new(config.poise.clone()),
            counters: CounterSystem::new(config.counter.clone()),
            combos: ComboSystem::new(config.combo.clone()),
            config,
            frame: 0,
            elapsed_ms: 0.0,
        }
    }

    /// Balance table in use.
    #[must_use]
    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Frames elapsed since the last reset.
    #[must_use]
    pub fn current_frame(&self) -> u64 {
        self.frame
    }

    /// Simulated milliseconds since the last reset.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.elapsed_ms.floor() as u64
    }

    /// Registered collision volumes.
    #[must_use]
    pub fn registry(&self) -> &HitboxRegistry {
        &self.registry
    }

    /// Mutable access to the registered collision volumes.
    pub fn registry_mut(&mut self) -> &mut HitboxRegistry {
        &mut self.registry
    }

    /// Knockback math used by this engine.
    #[must_use]
    pub fn knockback(&self) -> &KnockbackCalculator {
        &self.knockback
    }

    /// Advances one tick of `delta_ms` milliseconds.
    pub fn update(&mut self, delta_ms: f32) {
        debug_assert!(delta_ms >= 0.0, "negative tick length");
        let delta_ms = if delta_ms.is_finite() && delta_ms >= 0.0 {
            delta_ms
        } else {
            warn!(delta_ms, "ignoring invalid tick length");
            0.0
        };

        self.frame += 1;
        self.elapsed_ms += f64::from(delta_ms);
        let now = self.now_ms();

        // Windows must expire before this tick's collisions resolve.
        self.counters.update(self.frame);
        self.poise.update(delta_ms, now);
        self.poise.tick_stagger();
        trace!(frame = self.frame, now, "combat tick");
    }

    /// Resolves the first colliding pair between the attacker's active
    /// hitboxes and the defender's active hurtboxes, in stored order.
    pub fn process_attack(&mut self, attacker: &Fighter, defender: &Fighter) -> Option<HitResult> {
        let (hitbox, hurtbox) = first_collision(
            attacker.active_boxes(HitboxKind::Hitbox),
            defender.active_boxes(HitboxKind::Hurtbox),
        )?;
        let position = hit_position(hitbox, hurtbox);
        Some(self.resolve_hit(attacker, defender, hitbox, position))
    }

    /// Like [`Self::process_attack`], then steers the knockback by the
    /// defender's held direction.
    pub fn process_attack_with_di(
        &mut self,
        attacker: &Fighter,
        defender: &Fighter,
        di: Vec2,
    ) -> Option<HitResult> {
        let mut result = self.process_attack(attacker, defender)?;
        result.knockback = self.knockback.apply_di(result.knockback, di);
        Some(result)
    }

    /// Like [`Self::process_attack`], using volumes from the registry instead
    /// of the fighters' own snapshots.
    pub fn process_registered(
        &mut self,
        attacker: &Fighter,
        defender: &Fighter,
    ) -> Option<HitResult> {
        let (hitbox, position) = {
            let (hitbox, hurtbox) = self.registry.check_registered(attacker.id, defender.id)?;
            (hitbox.clone(), hit_position(hitbox, hurtbox))
        };
        Some(self.resolve_hit(attacker, defender, &hitbox, position))
    }

    /// Resolves a confirmed hit of `hitbox` from `attacker` onto `defender`.
    ///
    /// The parry window is read on the defender; the counter window belongs
    /// to the attacker (the bonus window a perfect parry opens).
    pub fn resolve_hit(
        &mut self,
        attacker: &Fighter,
        defender: &Fighter,
        hitbox: &Hitbox,
        position: Vec2,
    ) -> HitResult {
        let frame = self.frame;
        let now = self.now_ms();

        let was_parry = self.counters.check_parry(defender.id, frame).succeeded();
        let (source, target) = if was_parry {
            (defender, attacker)
        } else {
            (attacker, defender)
        };
        let was_counter = !was_parry && self.counters.check_counter(source.id, frame);

        let reaction =
            self.poise
                .calculate_reaction(target.id, hitbox, source.stats.weight, now);

        let base = self.damage.calculate_damage(hitbox);
        let damage = if was_parry {
            self.damage.parry_damage(base, &self.config.counter)
        } else if was_counter {
            self.damage.counter_damage(base, &self.config.counter)
        } else {
            base
        };
        self.damage.record(
            target.id,
            DamageRecord {
                amount: damage,
                damage_type: hitbox.damage_type,
                frame,
            },
        );

        let magnitude = self.knockback.calculate(&KnockbackInput {
            defender_damage: target.stats.current_damage,
            damage,
            weight: target.stats.weight,
            growth: hitbox.knockback_growth,
            base: hitbox.base_knockback,
            attacker_damage: source.stats.current_damage,
        });
        let knockback = self
            .knockback
            .knockback_vector(magnitude, hitbox.angle, source.facing);

        let result = HitResult {
            attacker: source.id,
            defender: target.id,
            damage,
            knockback,
            hitstun: self.knockback.hitstun(magnitude).max(hitbox.hitstun),
            hitlag: self
                .knockback
                .hitlag_with_minimum(damage, hitbox.hitlag, false),
            defender_hitlag: self
                .knockback
                .hitlag_with_minimum(damage, hitbox.hitlag, true),
            position,
            damage_type: hitbox.damage_type,
            was_counter,
            was_parry,
            reaction,
            tumble: self.knockback.should_tumble(magnitude, damage),
            launch: self.knockback.should_launch(magnitude, damage),
        };

        let combo = self.combos.record_hit(source.id, &result, now);
        debug!(
            attacker = %result.attacker,
            defender = %result.defender,
            damage = result.damage,
            knockback = magnitude,
            hitstun = result.hitstun,
            parry = was_parry,
            counter = was_counter,
            combo = combo.hits,
            "hit resolved"
        );
        result
    }

    /// Adds a hit's damage to the fighter it landed on, clamped to the lower
    /// of the global cap and the fighter's own cap. Returns the new damage.
    pub fn apply_hit_result(&self, fighter: &mut Fighter, result: &HitResult) -> f32 {
        if fighter.id != result.defender {
            warn!(
                fighter = %fighter.id,
                defender = %result.defender,
                "hit result applied to the wrong fighter"
            );
            return fighter.stats.current_damage;
        }
        let applied = self
            .damage
            .apply_damage(fighter.stats.current_damage, result.damage)
            .min(fighter.stats.max_damage);
        fighter.stats.current_damage = applied.max(0.0);
        fighter.stats.current_damage
    }

    /// Opens a counter window for `fighter` on the current frame.
    pub fn start_counter_window(&mut self, fighter: FighterId) {
        self.counters.start_counter_window(fighter, self.frame);
    }

    /// Opens a parry window for `fighter` on the current frame.
    pub fn start_parry_window(&mut self, fighter: FighterId) {
        self.counters.start_parry_window(fighter, self.frame);
    }

    /// Closes `fighter`'s counter window.
    pub fn end_counter_window(&mut self, fighter: FighterId) {
        self.counters.end_counter_window(fighter);
    }

    /// Closes `fighter`'s parry window.
    pub fn end_parry_window(&mut self, fighter: FighterId) {
        self.counters.end_parry_window(fighter);
    }

    /// Snapshot of `fighter`'s counter and parry windows.
    #[must_use]
    pub fn get_windows(&self, fighter: FighterId) -> Option<DefenseWindows> {
        self.counters.get_windows(fighter)
    }

    /// Sets up `fighter`'s poise pool explicitly.
    pub fn init_poise(&mut self, fighter: FighterId, max_poise: f32, regen_rate: f32) {
        self.poise.init_poise(fighter, max_poise, regen_rate);
    }

    /// Refills `fighter`'s poise pool.
    pub fn reset_poise(&mut self, fighter: FighterId) {
        self.poise.reset_poise(fighter);
    }

    /// Snapshot of `fighter`'s poise.
    #[must_use]
    pub fn get_poise_state(&self, fighter: FighterId) -> Option<PoiseState> {
        self.poise.get_poise_state(fighter)
    }

    /// `fighter`'s current combo as of now.
    pub fn get_combo(&mut self, fighter: FighterId) -> Option<ComboState> {
        let now = self.now_ms();
        self.combos.get_combo(fighter, now)
    }

    /// Ends `fighter`'s combo and returns it.
    pub fn end_combo(&mut self, fighter: FighterId) -> Option<ComboState> {
        self.combos.end_combo(fighter)
    }

    /// `fighter`'s longest finished combo.
    #[must_use]
    pub fn best_combo(&self, fighter: FighterId) -> Option<ComboState> {
        self.combos.best_combo(fighter)
    }

    /// Recent hits taken by `fighter`, oldest first.
    #[must_use]
    pub fn recent_damage(&self, fighter: FighterId) -> Vec<DamageRecord> {
        self.damage.recent_damage(fighter)
    }

    /// Purges one fighter from every subsystem.
    pub fn remove_fighter(&mut self, fighter: FighterId) {
        self.registry.clear_owner(fighter);
        self.damage.remove(fighter);
        self.poise.remove(fighter);
        self.counters.remove(fighter);
        self.combos.remove(fighter);
        debug!(%fighter, "fighter removed from combat");
    }

    /// Clears all per-fighter state and zeros the frame counter and clock.
    pub fn reset(&mut self) {
        self.registry.clear();
        self.damage.clear();
        self.poise.clear();
        self.counters.clear();
        self.combos.clear();
        self.frame = 0;
        self.elapsed_ms = 0.0;
        debug!("combat state reset");
    }

    /// Match-end cleanup; same as [`Self::reset`].
    pub fn reset_all(&mut self) {
        self.reset();
    }
}

fn hit_position(hitbox: &Hitbox, hurtbox: &Hitbox) -> Vec2 {
    hitbox
        .bounds
        .intersection(&hurtbox.bounds)
        .map_or_else(|| hitbox.bounds.center(), |overlap| overlap.center())
}
