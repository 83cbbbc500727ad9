//! Property-based tests using proptest
//!
//! Invariants that must hold for all inputs:
//! - Damage: accumulated damage stays within `[0, cap]`
//! - Poise: current poise stays within `[0, max]`
//! - Combo: multiplier is non-decreasing and capped
//! - Knockback: DI never changes magnitude and never exceeds its limit
//! - Collision: only hitbox-vs-hurtbox pairs score

use brawl_combat::prelude::*;
use brawl_common::{angle_between_deg, FighterId, Vec2};
use proptest::prelude::*;

const P1: FighterId = FighterId::new(1);
const P2: FighterId = FighterId::new(2);

fn kind_strategy() -> impl Strategy<Value = HitboxKind> {
    prop_oneof![
        Just(HitboxKind::Hitbox),
        Just(HitboxKind::Hurtbox),
        Just(HitboxKind::Grabbox),
        Just(HitboxKind::Projectile),
    ]
}

fn damage_type_strategy() -> impl Strategy<Value = DamageType> {
    prop_oneof![
        Just(DamageType::Physical),
        Just(DamageType::Energy),
        Just(DamageType::Special),
    ]
}

// ============================================================
// Damage Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_damage_stays_within_cap(
        start in 0.0f32..999.0,
        hits in prop::collection::vec(0.0f32..400.0, 1..20),
    ) {
        let system = DamageSystem::new(DamageConfig::default());
        let mut current = start;
        for incoming in hits {
            current = system.apply_damage(current, incoming);
            prop_assert!((0.0..=999.0).contains(&current), "damage {current} out of range");
        }
    }

    #[test]
    fn prop_applied_hits_respect_fighter_cap(
        damage in 0.0f32..300.0,
        max_damage in 1.0f32..999.0,
        rounds in 1usize..10,
    ) {
        let engine = CombatEngine::default();
        let mut fighter = Fighter::new(P2, 0, Vec2::ZERO);
        fighter.stats.max_damage = max_damage;
        let result = HitResult { defender: P2, damage, ..HitResult::default() };
        for _ in 0..rounds {
            let applied = engine.apply_hit_result(&mut fighter, &result);
            prop_assert!(applied >= 0.0 && applied <= max_damage);
        }
    }
}

// ============================================================
// Poise Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_poise_stays_clamped(
        max_poise in 1.0f32..500.0,
        hits in prop::collection::vec(0.0f32..80.0, 1..30),
        regen_ticks in 0u32..200,
    ) {
        let mut poise = PoiseSystem::new(PoiseConfig::default());
        poise.init_poise(P1, max_poise, 25.0);
        for (i, effective) in hits.iter().enumerate() {
            poise.apply_effective_damage(P1, *effective, i as u64 * 50);
            let state = poise.get_poise_state(P1).expect("state");
            prop_assert!(state.current_poise >= 0.0);
            prop_assert!(state.current_poise <= state.max_poise);
        }
        for tick in 0..regen_ticks {
            poise.update(16.0, 10_000 + u64::from(tick) * 16);
            poise.tick_stagger();
        }
        let state = poise.get_poise_state(P1).expect("state");
        prop_assert!(state.current_poise >= 0.0 && state.current_poise <= state.max_poise);
    }

    #[test]
    fn prop_broken_poise_staggers_within_limits(effective in 0.01f32..1000.0) {
        let mut poise = PoiseSystem::new(PoiseConfig::default());
        poise.init_poise(P1, 0.001, 0.0);
        let reaction = poise.apply_effective_damage(P1, effective, 0);
        let state = poise.get_poise_state(P1).expect("state");
        prop_assert!(state.is_staggered);
        prop_assert!(state.stagger_frames >= 20 && state.stagger_frames <= 60);
        prop_assert!(!reaction.can_act);
    }
}

// ============================================================
// Combo Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_combo_multiplier_monotonic_and_capped(
        gaps in prop::collection::vec(0u64..=1000, 1..60),
    ) {
        let mut combos = ComboSystem::new(ComboConfig::default());
        let result = HitResult { damage: 5.0, ..HitResult::default() };
        let mut now = 0;
        let mut previous = 1.0;
        let mut expected_hits = 0;
        for gap in gaps {
            now += gap;
            let combo = combos.record_hit(P1, &result, now);
            expected_hits += 1;
            prop_assert_eq!(combo.hits, expected_hits);
            prop_assert!(combo.multiplier >= previous);
            prop_assert!(combo.multiplier <= 2.0);
            previous = combo.multiplier;
        }
    }

    #[test]
    fn prop_stale_combo_restarts(first_gap in 1001u64..100_000) {
        let mut combos = ComboSystem::new(ComboConfig::default());
        let result = HitResult { damage: 5.0, ..HitResult::default() };
        combos.record_hit(P1, &result, 0);
        combos.record_hit(P1, &result, 100);
        let combo = combos.record_hit(P1, &result, 100 + first_gap);
        prop_assert_eq!(combo.hits, 1);
    }
}

// ============================================================
// Knockback Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_di_preserves_magnitude_and_limit(
        magnitude in 1.0f32..400.0,
        angle in 0.0f32..360.0,
        di_x in -1.0f32..1.0,
        di_y in -1.0f32..1.0,
    ) {
        let calc = KnockbackCalculator::new(KnockbackConfig::default());
        let kb = calc.knockback_vector(magnitude, angle, Facing::Right);
        let steered = calc.apply_di(kb, Vec2::new(di_x, di_y));
        prop_assert!((steered.length() - kb.length()).abs() < magnitude * 1e-4);
        prop_assert!(angle_between_deg(kb, steered) <= 15.0 + 1e-2);
    }

    #[test]
    fn prop_knockback_non_negative_and_monotonic_in_percent(
        percent in 0.0f32..500.0,
        extra in 0.1f32..100.0,
        damage in 0.0f32..50.0,
        weight in 0.0f32..200.0,
        growth in 0.0f32..3.0,
        base in 0.0f32..100.0,
    ) {
        let calc = KnockbackCalculator::new(KnockbackConfig::default());
        let input = KnockbackInput {
            defender_damage: percent,
            damage,
            weight,
            growth,
            base,
            attacker_damage: 0.0,
        };
        let low = calc.calculate(&input);
        let high = calc.calculate(&KnockbackInput { defender_damage: percent + extra, ..input });
        prop_assert!(low >= 0.0);
        prop_assert!(high >= low);
        prop_assert!(calc.hitlag(damage, true) <= 20);
    }
}

// ============================================================
// Collision Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_only_hitbox_vs_hurtbox_scores(
        a_kind in kind_strategy(),
        b_kind in kind_strategy(),
        damage_type in damage_type_strategy(),
        x in -50.0f32..50.0,
        y in -50.0f32..50.0,
    ) {
        let a = Hitbox::new(P1, a_kind, Rect::new(0.0, 0.0, 40.0, 40.0))
            .with_damage_type(damage_type);
        let b = Hitbox::new(P2, b_kind, Rect::new(x, y, 40.0, 40.0));
        let overlap = a.bounds.overlaps(&b.bounds);
        let scores = check_collision(&a, &b);
        let valid_pair = a_kind == HitboxKind::Hitbox && b_kind == HitboxKind::Hurtbox;
        prop_assert_eq!(scores, valid_pair && overlap);
    }

    #[test]
    fn prop_overlap_is_symmetric(
        ax in -100.0f32..100.0, ay in -100.0f32..100.0,
        aw in 0.1f32..80.0, ah in 0.1f32..80.0,
        bx in -100.0f32..100.0, by in -100.0f32..100.0,
        bw in 0.1f32..80.0, bh in 0.1f32..80.0,
    ) {
        let a = Rect::new(ax, ay, aw, ah);
        let b = Rect::new(bx, by, bw, bh);
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        prop_assert_eq!(a.overlaps(&b), a.intersection(&b).is_some());
    }
}
