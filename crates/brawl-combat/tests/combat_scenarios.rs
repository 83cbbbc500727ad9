//! Scripted combat scenarios driven through the public API, the way a game
//! loop would: tick, open windows from input, resolve attacks, apply results.

use brawl_combat::prelude::*;
use brawl_common::{FighterId, Vec2};

const P1: FighterId = FighterId::new(1);
const P2: FighterId = FighterId::new(2);
const TICK_MS: f32 = 1000.0 / 60.0;

fn forward_smash() -> Hitbox {
    Hitbox::attack(P1, Rect::new(30.0, -20.0, 40.0, 20.0))
        .with_damage(20.0)
        .with_knockback(18.0, 1.0)
        .with_angle(45.0)
}

fn attacker() -> Fighter {
    Fighter::new(P1, 0, Vec2::ZERO)
        .with_facing(Facing::Right)
        .with_hitbox(Hitbox::hurtbox(P1, Rect::new(-15.0, -40.0, 30.0, 40.0)))
        .with_hitbox(forward_smash())
}

fn defender() -> Fighter {
    Fighter::new(P2, 1, Vec2::new(60.0, 0.0))
        .with_facing(Facing::Left)
        .with_weight(100.0)
        .with_damage(50.0)
        .with_hitbox(Hitbox::hurtbox(P2, Rect::new(45.0, -40.0, 30.0, 40.0)))
}

fn tick(engine: &mut CombatEngine, frames: u32) {
    for _ in 0..frames {
        engine.update(TICK_MS);
    }
}

#[test]
fn test_smash_launches_up_and_forward() {
    let mut engine = CombatEngine::new(CombatConfig::default());
    tick(&mut engine, 1);
    let attacker = attacker();
    let mut defender = defender();

    let result = engine.process_attack(&attacker, &defender).expect("hit");
    assert_eq!(result.attacker, P1);
    assert_eq!(result.defender, P2);
    assert!(result.knockback.x > 0.0, "knockback should push right");
    assert!(result.knockback.y < 0.0, "knockback should push up");
    assert!(result.hitstun > 0);
    assert!(result.hitlag > 0 && result.defender_hitlag >= result.hitlag);
    assert!(!result.was_counter && !result.was_parry);

    engine.apply_hit_result(&mut defender, &result);
    assert_eq!(defender.stats.current_damage, 70.0);
}

#[test]
fn test_knockback_grows_with_percent() {
    let mut engine = CombatEngine::default();
    let attacker = attacker();
    let mut defender = defender();

    let mut last = 0.0;
    for _ in 0..5 {
        let result = engine.process_attack(&attacker, &defender).expect("hit");
        let magnitude = result.knockback.length();
        assert!(magnitude > last);
        last = magnitude;
        engine.apply_hit_result(&mut defender, &result);
    }
    assert_eq!(defender.stats.current_damage, 150.0);
}

#[test]
fn test_damage_never_exceeds_cap() {
    let mut engine = CombatEngine::default();
    let attacker = attacker();
    let mut defender = defender().with_damage(995.0);
    let result = engine.process_attack(&attacker, &defender).expect("hit");
    engine.apply_hit_result(&mut defender, &result);
    assert_eq!(defender.stats.current_damage, 999.0);
}

#[test]
fn test_first_active_hitbox_wins() {
    let mut engine = CombatEngine::default();
    let weak = Hitbox::attack(P1, Rect::new(30.0, -20.0, 40.0, 20.0)).with_damage(3.0);
    let inactive = Hitbox::attack(P1, Rect::new(30.0, -20.0, 40.0, 20.0))
        .with_damage(50.0)
        .with_active(false);
    let attacker = Fighter::new(P1, 0, Vec2::ZERO)
        .with_hitbox(inactive)
        .with_hitbox(weak)
        .with_hitbox(forward_smash());

    let result = engine.process_attack(&attacker, &defender()).expect("hit");
    assert_eq!(result.damage, 3.0);
    assert_eq!(engine.get_combo(P1).expect("combo").hits, 1);
}

#[test]
fn test_hurtbox_never_hits_hurtbox() {
    let mut engine = CombatEngine::default();
    let attacker = Fighter::new(P1, 0, Vec2::ZERO)
        .with_hitbox(Hitbox::hurtbox(P1, Rect::new(45.0, -40.0, 30.0, 40.0)));
    assert!(engine.process_attack(&attacker, &defender()).is_none());
}

#[test]
fn test_perfect_parry_reflects_and_opens_counter() {
    let mut engine = CombatEngine::default();
    tick(&mut engine, 10);
    let attacker = attacker();
    let defender = defender().with_hitbox(
        Hitbox::attack(P2, Rect::new(0.0, -30.0, 50.0, 20.0))
            .with_damage(8.0)
            .with_knockback(10.0, 0.5)
            .with_angle(30.0),
    );

    engine.start_parry_window(P2);
    let parried = engine.process_attack(&attacker, &defender).expect("hit");
    assert!(parried.was_parry);
    assert_eq!(parried.attacker, P2);
    assert_eq!(parried.defender, P1);
    assert_eq!(parried.damage, 40.0);
    // P2 faces left, so the reflected hit sends P1 left.
    assert!(parried.knockback.x < 0.0);

    let windows = engine.get_windows(P2).expect("windows");
    assert!(!windows.parry.active);
    assert!(windows.counter.active);
    assert_eq!(windows.counter.start_frame, 12);

    // P2 swings back inside the bonus window for a counter hit.
    tick(&mut engine, 2);
    let counter = engine.process_attack(&defender, &attacker).expect("hit");
    assert!(counter.was_counter);
    assert_eq!(counter.damage, 12.0);
    assert_eq!(engine.get_combo(P2).expect("combo").hits, 2);
}

#[test]
fn test_late_parry_is_not_perfect() {
    let mut engine = CombatEngine::default();
    engine.start_parry_window(P2);
    tick(&mut engine, 5);
    let result = engine.process_attack(&attacker(), &defender()).expect("hit");
    assert!(result.was_parry);
    assert!(!engine.get_windows(P2).expect("windows").counter.active);
}

#[test]
fn test_parry_window_expires() {
    let mut engine = CombatEngine::default();
    engine.start_parry_window(P2);
    tick(&mut engine, 6);
    let result = engine.process_attack(&attacker(), &defender()).expect("hit");
    assert!(!result.was_parry);
    assert_eq!(result.defender, P2);
}

#[test]
fn test_explicitly_ended_window_does_not_score() {
    let mut engine = CombatEngine::default();
    engine.start_counter_window(P1);
    engine.end_counter_window(P1);
    let result = engine.process_attack(&attacker(), &defender()).expect("hit");
    assert!(!result.was_counter);
}

#[test]
fn test_combo_chains_then_drops() {
    let mut engine = CombatEngine::default();
    let attacker = attacker();
    let defender = defender();

    for _ in 0..3 {
        engine.process_attack(&attacker, &defender);
        tick(&mut engine, 20);
    }
    let combo = engine.get_combo(P1).expect("combo");
    assert_eq!(combo.hits, 3);
    assert!((combo.multiplier - 1.2).abs() < 1e-5);

    // Just over a second of silence drops the combo.
    tick(&mut engine, 62);
    assert!(engine.get_combo(P1).is_none());
    engine.process_attack(&attacker, &defender);
    assert_eq!(engine.get_combo(P1).expect("combo").hits, 1);
    assert_eq!(engine.best_combo(P1).expect("best").hits, 3);
}

#[test]
fn test_poise_breaks_then_recovers() {
    let mut engine = CombatEngine::default();
    let attacker = attacker();
    let defender = defender();

    let mut reactions = Vec::new();
    for _ in 0..5 {
        let result = engine.process_attack(&attacker, &defender).expect("hit");
        reactions.push(result.reaction.kind);
    }
    assert_eq!(reactions[0], HitReactionKind::Flinch);
    assert_eq!(reactions[4], HitReactionKind::Stagger);
    let broken = engine.get_poise_state(P2).expect("poise");
    assert_eq!(broken.current_poise, 0.0);
    assert!(broken.is_staggered);

    // Stagger wears off, then poise refills after the quiet period.
    tick(&mut engine, 120);
    let recovered = engine.get_poise_state(P2).expect("poise");
    assert!(!recovered.is_staggered);
    assert!(recovered.current_poise > 0.0);
    assert!(recovered.current_poise <= recovered.max_poise);
}

#[test]
fn test_remove_fighter_purges_state() {
    let mut engine = CombatEngine::default();
    engine.start_parry_window(P2);
    engine.process_attack(&attacker(), &defender());
    engine.remove_fighter(P2);
    assert!(engine.get_windows(P2).is_none());
    assert!(engine.get_poise_state(P1).is_some());
    assert_eq!(engine.recent_damage(P1).len(), 1);
}

#[test]
fn test_ai_driven_exchange() {
    let config = CombatConfig::default();
    let mut engine = CombatEngine::new(config.clone());
    let mut ai = TacticalAI::new(config.ai.clone(), 99);
    ai.initialize_ai(P2, Difficulty::Hard, Personality::Balanced);

    let fighters = [attacker(), defender()];
    let assess = ai.default_assessment();
    let mut last_action = AIAction::idle();
    for _ in 0..30 {
        engine.update(TICK_MS);
        last_action = ai.update(P2, engine.now_ms(), &fighters, &assess);
    }
    assert!(last_action.direction.length() <= 1.0 + 1e-5);
    let state = ai.get_ai_state(P2).expect("state");
    assert_eq!(state.difficulty, Difficulty::Hard);
    assert!(state.last_decision_ms.is_some());
}

#[test]
fn test_retreat_with_symmetric_threats_defaults_right() {
    let me = Vec2::new(0.0, 0.0);
    let threats = [Vec2::new(0.0, -50.0), Vec2::new(0.0, 50.0)];
    assert_eq!(safe_direction(me, threats), Vec2::new(1.0, 0.0));
}

#[test]
fn test_config_drives_engine() {
    let config = CombatConfig::from_toml_str(
        r#"
        [counter]
        parry_multiplier = 3.0
        "#,
    )
    .expect("valid config");
    config.validate().expect("consistent config");

    let mut engine = CombatEngine::new(config);
    engine.start_parry_window(P2);
    let result = engine.process_attack(&attacker(), &defender()).expect("hit");
    assert_eq!(result.damage, 60.0);
}
