//! Tactical AI for computer-controlled fighters.
//!
//! This module provides:
//! - Difficulty and personality settings
//! - A throttled decision cycle over seven behaviors
//! - Deterministic mapping from behavior to [`AIAction`]
//!
//! Decisions are recomputed at most once per update interval. Between
//! decisions the previous behavior keeps running against live positions, so
//! movement stays smooth. The AI only reads fighters; callers apply the
//! returned actions themselves.

use brawl_common::{angle_between_deg, FighterId, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::config::AiConfig;
use crate::fighter::Fighter;

// ============================================================================
// Settings
// ============================================================================

/// AI skill level. Only affects decision accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    /// 50% accurate
    Easy,
    /// 70% accurate
    #[default]
    Medium,
    /// 85% accurate
    Hard,
    /// 90% accurate
    Expert,
    /// 95% accurate
    Legendary,
}

/// AI temperament.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Personality {
    /// Never retreats
    Aggressive,
    /// Default temperament
    #[default]
    Balanced,
    /// Counters instead of pressuring up close
    Defensive,
}

impl Personality {
    /// Baseline aggression level in `[0, 1]`.
    #[must_use]
    pub fn aggression(self) -> f32 {
        match self {
            Self::Aggressive => 0.8,
            Self::Balanced => 0.5,
            Self::Defensive => 0.2,
        }
    }
}

/// High-level behavior chosen by a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AIBehavior {
    /// Hold position
    #[default]
    Assess,
    /// Close distance to the target
    Approach,
    /// Move away from every threat
    Retreat,
    /// Circle to the target's open side
    Flank,
    /// Attack at close range
    Pressure,
    /// Heavy attack on a vulnerable target
    Punish,
    /// Wait for the opponent's attack and counter it
    CounterAttack,
}

impl AIBehavior {
    /// Every behavior, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Assess,
        Self::Approach,
        Self::Retreat,
        Self::Flank,
        Self::Pressure,
        Self::Punish,
        Self::CounterAttack,
    ];
}

/// Side of the target to flank towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlankSide {
    /// -X side of the target
    Left,
    /// +X side of the target
    Right,
}

impl FlankSide {
    fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Decision state of one AI fighter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AIState {
    /// Skill level
    pub difficulty: Difficulty,
    /// Temperament
    pub personality: Personality,
    /// Current behavior
    pub behavior: AIBehavior,
    /// Current target
    pub target: Option<FighterId>,
    /// Flank side, when flanking
    pub flank_side: Option<FlankSide>,
    /// Retreat point, when retreating
    pub retreat_position: Option<Vec2>,
    /// Aggression level in `[0, 1]`
    pub aggression: f32,
    /// Time between decisions (ms)
    pub decision_cooldown_ms: u64,
    /// Clock time (ms) of the last decision
    pub last_decision_ms: Option<u64>,
}

impl AIState {
    fn new(difficulty: Difficulty, personality: Personality, cooldown_ms: u64) -> Self {
        Self {
            difficulty,
            personality,
            behavior: AIBehavior::Assess,
            target: None,
            flank_side: None,
            retreat_position: None,
            aggression: personality.aggression(),
            decision_cooldown_ms: cooldown_ms,
            last_decision_ms: None,
        }
    }

    fn decision_due(&self, now_ms: u64) -> bool {
        match self.last_decision_ms {
            None => true,
            // A clock that went backwards counts as elapsed.
            Some(last) => now_ms < last || now_ms - last >= self.decision_cooldown_ms,
        }
    }
}

// ============================================================================
// Actions
// ============================================================================

/// Attack the AI wants to throw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackKind {
    /// Fast, low damage
    Light,
    /// Slow, high damage
    Heavy,
    /// Character special
    Special,
    /// Grab
    Grab,
}

/// Extra input held alongside an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionModifier {
    /// Dash instead of walking
    Dash,
    /// Hold counter
    Counter,
}

/// Input the AI wants applied this tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AIAction {
    /// Unit movement direction, zero to stand still
    pub direction: Vec2,
    /// Attack to throw, if any
    pub attack: Option<AttackKind>,
    /// Held modifiers
    pub modifiers: Vec<ActionModifier>,
}

impl AIAction {
    /// No movement, no attack.
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    fn moving(direction: Vec2) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    fn with_attack(mut self, attack: AttackKind) -> Self {
        self.attack = Some(attack);
        self
    }

    fn with_modifier(mut self, modifier: ActionModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Checks whether a modifier is held.
    #[must_use]
    pub fn has_modifier(&self, modifier: ActionModifier) -> bool {
        self.modifiers.contains(&modifier)
    }
}

// ============================================================================
// Target assessment
// ============================================================================

/// Decides whether a target is open to a punish.
///
/// The state-machine layer can supply richer checks (endlag, non-actionable
/// states); [`DamageThreshold`] is the built-in fallback.
pub trait TargetAssessment {
    /// Checks if the target can be punished right now.
    fn is_vulnerable(&self, target: &Fighter) -> bool;
}

/// Treats targets above a damage percent as vulnerable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageThreshold(pub f32);

impl TargetAssessment for DamageThreshold {
    fn is_vulnerable(&self, target: &Fighter) -> bool {
        target.stats.current_damage > self.0
    }
}

/// Direction away from every threat: the normalized sum of unit vectors
/// pointing from each threat to `position`. Falls back to +X when they cancel.
#[must_use]
pub fn safe_direction<I>(position: Vec2, threats: I) -> Vec2
where
    I: IntoIterator<Item = Vec2>,
{
    let away = threats
        .into_iter()
        .fold(Vec2::ZERO, |sum, threat| sum + threat.direction_to(position));
    if away.length() < 1e-4 {
        Vec2::RIGHT
    } else {
        away.normalized()
    }
}

// ============================================================================
// Tactical AI
// ============================================================================

/// Drives every AI-controlled fighter in a match.
#[derive(Debug)]
pub struct TacticalAI {
    config: AiConfig,
    states: HashMap<FighterId, AIState>,
    rng: fastrand::Rng,
}

impl TacticalAI {
    /// Creates an AI driver. The seed fixes the decision noise.
    #[must_use]
    pub fn new(config: AiConfig, seed: u64) -> Self {
        Self {
            config,
            states: HashMap::new(),
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    /// Built-in vulnerability check from the configured damage threshold.
    #[must_use]
    pub fn default_assessment(&self) -> DamageThreshold {
        DamageThreshold(self.config.vulnerable_damage)
    }

    /// Puts a fighter under AI control, replacing any previous state.
    pub fn initialize_ai(
        &mut self,
        fighter: FighterId,
        difficulty: Difficulty,
        personality: Personality,
    ) {
        let state = AIState::new(difficulty, personality, self.config.update_interval_ms);
        self.states.insert(fighter, state);
        debug!(%fighter, ?difficulty, ?personality, "AI initialized");
    }

    /// Releases a fighter from AI control.
    pub fn remove_ai(&mut self, fighter: FighterId) -> Option<AIState> {
        self.states.remove(&fighter)
    }

    /// Changes a fighter's difficulty. Returns false if it is not AI-controlled.
    pub fn set_difficulty(&mut self, fighter: FighterId, difficulty: Difficulty) -> bool {
        match self.states.get_mut(&fighter) {
            Some(state) => {
                state.difficulty = difficulty;
                true
            },
            None => false,
        }
    }

    /// Decision state of a fighter.
    #[must_use]
    pub fn get_ai_state(&self, fighter: FighterId) -> Option<&AIState> {
        self.states.get(&fighter)
    }

    /// Number of AI-controlled fighters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Checks if no fighter is AI-controlled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Computes this tick's action for `fighter`.
    ///
    /// `fighters` is every fighter in the match, including `fighter` itself.
    /// Unknown or absent fighters get [`AIAction::idle`].
    pub fn update<A>(
        &mut self,
        fighter: FighterId,
        now_ms: u64,
        fighters: &[Fighter],
        assess: &A,
    ) -> AIAction
    where
        A: TargetAssessment + ?Sized,
    {
        let Some(me) = fighters.iter().find(|f| f.id == fighter) else {
            return AIAction::idle();
        };
        let Self { config, states, rng } = self;
        let Some(state) = states.get_mut(&fighter) else {
            return AIAction::idle();
        };

        if state.decision_due(now_ms) {
            let previous = state.behavior;
            decide(config, rng, state, me, fighters, assess);
            state.last_decision_ms = Some(now_ms);
            if state.behavior != previous {
                debug!(
                    %fighter,
                    from = ?previous,
                    to = ?state.behavior,
                    target = ?state.target,
                    "AI behavior changed"
                );
            }
        }

        execute(config, state, me, fighters)
    }
}

fn opponents<'a>(me: &'a Fighter, fighters: &'a [Fighter]) -> impl Iterator<Item = &'a Fighter> {
    fighters.iter().filter(move |f| me.is_opponent_of(f))
}

/// Opponent with the highest damage; ties go to the lowest ID.
fn select_target<'a>(me: &'a Fighter, fighters: &'a [Fighter]) -> Option<&'a Fighter> {
    opponents(me, fighters).max_by(|a, b| {
        a.stats
            .current_damage
            .total_cmp(&b.stats.current_damage)
            .then_with(|| b.id.cmp(&a.id))
    })
}

/// Side to flank towards, if an ally is already engaging the target from a
/// sufficiently different angle.
fn flank_side(
    config: &AiConfig,
    me: &Fighter,
    target: &Fighter,
    fighters: &[Fighter],
) -> Option<FlankSide> {
    let my_lane = me.position - target.position;
    fighters
        .iter()
        .filter(|ally| me.is_ally_of(ally))
        .filter(|ally| ally.position.distance(target.position) < config.pressure_range)
        .find(|ally| {
            angle_between_deg(ally.position - target.position, my_lane) > config.flank_angle_deg
        })
        .map(|ally| {
            if ally.position.x < target.position.x {
                FlankSide::Right
            } else {
                FlankSide::Left
            }
        })
}

fn retreat_point(config: &AiConfig, me: &Fighter, fighters: &[Fighter]) -> Vec2 {
    let direction = safe_direction(me.position, opponents(me, fighters).map(|f| f.position));
    me.position + direction * config.retreat_distance
}

fn decide<A>(
    config: &AiConfig,
    rng: &mut fastrand::Rng,
    state: &mut AIState,
    me: &Fighter,
    fighters: &[Fighter],
    assess: &A,
) where
    A: TargetAssessment + ?Sized,
{
    state.flank_side = None;
    state.retreat_position = None;

    let low_health = me.stats.health_fraction() < config.low_health_ratio;
    let mut behavior = if low_health && state.personality != Personality::Aggressive {
        state.target = None;
        state.retreat_position = Some(retreat_point(config, me, fighters));
        AIBehavior::Retreat
    } else if let Some(target) = select_target(me, fighters) {
        state.target = Some(target.id);
        let distance = me.position.distance(target.position);
        if assess.is_vulnerable(target) {
            AIBehavior::Punish
        } else if distance < config.pressure_range {
            if state.personality == Personality::Defensive {
                AIBehavior::CounterAttack
            } else {
                AIBehavior::Pressure
            }
        } else if distance <= config.approach_range {
            match flank_side(config, me, target, fighters) {
                Some(side) => {
                    state.flank_side = Some(side);
                    AIBehavior::Flank
                },
                None => AIBehavior::Approach,
            }
        } else {
            AIBehavior::Approach
        }
    } else {
        state.target = None;
        AIBehavior::Assess
    };

    // One draw per decision keeps seeded runs reproducible.
    let accuracy = config.accuracy.get(state.difficulty);
    if rng.f32() >= accuracy {
        behavior = AIBehavior::ALL[rng.usize(..AIBehavior::ALL.len())];
    }
    state.behavior = behavior;
}

fn execute(config: &AiConfig, state: &AIState, me: &Fighter, fighters: &[Fighter]) -> AIAction {
    let target = state
        .target
        .and_then(|id| fighters.iter().find(|f| f.id == id));

    match state.behavior {
        AIBehavior::Assess => AIAction::idle(),
        AIBehavior::Retreat => {
            let point = state
                .retreat_position
                .unwrap_or_else(|| retreat_point(config, me, fighters));
            AIAction::moving(me.position.direction_to(point))
        },
        AIBehavior::CounterAttack => AIAction::idle().with_modifier(ActionModifier::Counter),
        AIBehavior::Approach => {
            let Some(target) = target else {
                return AIAction::idle();
            };
            let action = AIAction::moving(me.position.direction_to(target.position));
            if me.position.distance(target.position) > config.approach_range {
                action.with_modifier(ActionModifier::Dash)
            } else {
                action
            }
        },
        AIBehavior::Flank => {
            let Some(target) = target else {
                return AIAction::idle();
            };
            let side = state.flank_side.unwrap_or(FlankSide::Right);
            let point = Vec2::new(
                target.position.x + side.sign() * config.flank_offset,
                target.position.y,
            );
            AIAction::moving(me.position.direction_to(point))
        },
        AIBehavior::Pressure => {
            let Some(target) = target else {
                return AIAction::idle();
            };
            let action = AIAction::moving(me.position.direction_to(target.position))
                .with_attack(AttackKind::Light);
            if state.aggression >= 0.7 {
                action.with_modifier(ActionModifier::Dash)
            } else {
                action
            }
        },
        AIBehavior::Punish => {
            let Some(target) = target else {
                return AIAction::idle();
            };
            let action = AIAction::moving(me.position.direction_to(target.position))
                .with_attack(AttackKind::Heavy);
            if me.position.distance(target.position) > config.pressure_range {
                action.with_modifier(ActionModifier::Dash)
            } else {
                action
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AccuracyTable;

    const AI: FighterId = FighterId::new(1);
    const FOE: FighterId = FighterId::new(2);
    const ALLY: FighterId = FighterId::new(3);

    /// Config with perfect accuracy so decisions are noise-free.
    fn exact_config() -> AiConfig {
        AiConfig {
            accuracy: AccuracyTable {
                easy: 1.0,
                medium: 1.0,
                hard: 1.0,
                expert: 1.0,
                legendary: 1.0,
            },
            ..AiConfig::default()
        }
    }

    fn ai_with(personality: Personality) -> TacticalAI {
        let mut ai = TacticalAI::new(exact_config(), 7);
        ai.initialize_ai(AI, Difficulty::Legendary, personality);
        ai
    }

    fn fighter(id: FighterId, team: u8, x: f32) -> Fighter {
        Fighter::new(id, team, Vec2::new(x, 0.0))
    }

    #[test]
    fn test_safe_direction_symmetric_threats() {
        let me = Vec2::new(10.0, 10.0);
        let threats = [Vec2::new(0.0, 10.0), Vec2::new(20.0, 10.0)];
        assert_eq!(safe_direction(me, threats), Vec2::RIGHT);
        assert_eq!(safe_direction(me, []), Vec2::RIGHT);

        let away = safe_direction(me, [Vec2::new(10.0, 0.0)]);
        assert!(away.approx_eq(Vec2::DOWN, 1e-5));
    }

    #[test]
    fn test_unknown_fighter_is_idle() {
        let mut ai = TacticalAI::new(exact_config(), 1);
        let fighters = [fighter(AI, 0, 0.0)];
        let assess = ai.default_assessment();
        assert_eq!(ai.update(AI, 0, &fighters, &assess), AIAction::idle());

        let mut ai = ai_with(Personality::Balanced);
        assert_eq!(ai.update(AI, 0, &[], &assess), AIAction::idle());
    }

    #[test]
    fn test_low_health_retreats() {
        let mut ai = ai_with(Personality::Balanced);
        let fighters = [
            fighter(AI, 0, 0.0).with_damage(800.0),
            fighter(FOE, 1, 100.0),
        ];
        let assess = ai.default_assessment();
        let action = ai.update(AI, 0, &fighters, &assess);
        let state = ai.get_ai_state(AI).expect("state");
        assert_eq!(state.behavior, AIBehavior::Retreat);
        assert_eq!(state.retreat_position, Some(Vec2::new(-500.0, 0.0)));
        assert!(action.direction.approx_eq(Vec2::LEFT, 1e-5));
    }

    #[test]
    fn test_aggressive_never_retreats() {
        let mut ai = ai_with(Personality::Aggressive);
        let fighters = [
            fighter(AI, 0, 0.0).with_damage(800.0),
            fighter(FOE, 1, 100.0),
        ];
        let assess = ai.default_assessment();
        let action = ai.update(AI, 0, &fighters, &assess);
        assert_eq!(ai.get_ai_state(AI).expect("state").behavior, AIBehavior::Pressure);
        assert_eq!(action.attack, Some(AttackKind::Light));
        assert!(action.has_modifier(ActionModifier::Dash));
    }

    #[test]
    fn test_distance_bands() {
        let assess = DamageThreshold(100.0);
        let cases = [
            (150.0, Personality::Balanced, AIBehavior::Pressure),
            (150.0, Personality::Defensive, AIBehavior::CounterAttack),
            (300.0, Personality::Balanced, AIBehavior::Approach),
            (800.0, Personality::Balanced, AIBehavior::Approach),
        ];
        for (x, personality, expected) in cases {
            let mut ai = ai_with(personality);
            let fighters = [fighter(AI, 0, 0.0), fighter(FOE, 1, x)];
            ai.update(AI, 0, &fighters, &assess);
            assert_eq!(ai.get_ai_state(AI).expect("state").behavior, expected, "x = {x}");
        }
    }

    #[test]
    fn test_vulnerable_target_is_punished() {
        let mut ai = ai_with(Personality::Balanced);
        let fighters = [
            fighter(AI, 0, 0.0),
            fighter(FOE, 1, 300.0).with_damage(150.0),
        ];
        let assess = ai.default_assessment();
        let action = ai.update(AI, 0, &fighters, &assess);
        assert_eq!(ai.get_ai_state(AI).expect("state").behavior, AIBehavior::Punish);
        assert_eq!(action.attack, Some(AttackKind::Heavy));
        assert!(action.has_modifier(ActionModifier::Dash));
    }

    #[test]
    fn test_targets_most_damaged_opponent() {
        let mut ai = ai_with(Personality::Balanced);
        let fighters = [
            fighter(AI, 0, 0.0),
            fighter(FOE, 1, 300.0).with_damage(20.0),
            fighter(FighterId::new(4), 1, -300.0).with_damage(60.0),
        ];
        ai.update(AI, 0, &fighters, &DamageThreshold(100.0));
        assert_eq!(
            ai.get_ai_state(AI).expect("state").target,
            Some(FighterId::new(4))
        );
    }

    #[test]
    fn test_flanks_when_ally_engages() {
        let mut ai = ai_with(Personality::Balanced);
        // Ally engages from the left, AI comes from above.
        let fighters = [
            Fighter::new(AI, 0, Vec2::new(0.0, -300.0)),
            fighter(FOE, 1, 0.0),
            fighter(ALLY, 0, -100.0),
        ];
        let action = ai.update(AI, 0, &fighters, &DamageThreshold(100.0));
        let state = ai.get_ai_state(AI).expect("state");
        assert_eq!(state.behavior, AIBehavior::Flank);
        assert_eq!(state.flank_side, Some(FlankSide::Right));
        assert!(action.direction.x > 0.0 && action.direction.y > 0.0);
    }

    #[test]
    fn test_decisions_are_throttled() {
        let mut ai = ai_with(Personality::Balanced);
        let assess = DamageThreshold(100.0);
        let far = [fighter(AI, 0, 0.0), fighter(FOE, 1, 800.0)];
        ai.update(AI, 1000, &far, &assess);
        assert_eq!(ai.get_ai_state(AI).expect("state").behavior, AIBehavior::Approach);

        // Target closes in, but the cooldown has not elapsed.
        let near = [fighter(AI, 0, 0.0), fighter(FOE, 1, -150.0)];
        let action = ai.update(AI, 1050, &near, &assess);
        assert_eq!(ai.get_ai_state(AI).expect("state").behavior, AIBehavior::Approach);
        // The old behavior tracks the live position.
        assert!(action.direction.approx_eq(Vec2::LEFT, 1e-5));

        ai.update(AI, 1100, &near, &assess);
        assert_eq!(ai.get_ai_state(AI).expect("state").behavior, AIBehavior::Pressure);
    }

    #[test]
    fn test_clock_rewind_forces_decision() {
        let mut ai = ai_with(Personality::Balanced);
        let assess = DamageThreshold(100.0);
        ai.update(AI, 5000, &[fighter(AI, 0, 0.0), fighter(FOE, 1, 800.0)], &assess);
        ai.update(AI, 0, &[fighter(AI, 0, 0.0), fighter(FOE, 1, 100.0)], &assess);
        let state = ai.get_ai_state(AI).expect("state");
        assert_eq!(state.behavior, AIBehavior::Pressure);
        assert_eq!(state.last_decision_ms, Some(0));
    }

    #[test]
    fn test_seeded_noise_is_reproducible() {
        let run = |seed| {
            let mut ai = TacticalAI::new(AiConfig::default(), seed);
            ai.initialize_ai(AI, Difficulty::Easy, Personality::Balanced);
            let fighters = [fighter(AI, 0, 0.0), fighter(FOE, 1, 300.0)];
            (0..50)
                .map(|tick| {
                    ai.update(AI, tick * 100, &fighters, &DamageThreshold(100.0));
                    ai.get_ai_state(AI).expect("state").behavior
                })
                .collect::<Vec<_>>()
        };
        let first = run(42);
        assert_eq!(first, run(42));
        assert!(first.iter().any(|b| *b != AIBehavior::Approach));
    }

    #[test]
    fn test_lifecycle() {
        let mut ai = ai_with(Personality::Balanced);
        assert!(ai.set_difficulty(AI, Difficulty::Easy));
        assert_eq!(ai.get_ai_state(AI).expect("state").difficulty, Difficulty::Easy);
        assert!(!ai.set_difficulty(FOE, Difficulty::Easy));
        assert!(ai.remove_ai(AI).is_some());
        assert!(ai.is_empty());
    }
}
