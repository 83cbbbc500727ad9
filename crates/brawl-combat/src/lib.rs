//! # Brawl Combat
//!
//! Deterministic combat resolution for a 2D platform fighter.
//!
//! This crate provides:
//! - Balance configuration loaded from TOML or RON
//! - Hitbox/hurtbox registry and box collision
//! - Damage, knockback, hitstun and hitlag
//! - Counter and parry windows
//! - Poise and stagger reactions
//! - Combo tracking
//! - The combat engine that ties these together
//! - Tactical AI for computer-controlled fighters

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod ai;
pub mod combo;
pub mod config;
pub mod counter;
pub mod damage;
pub mod engine;
pub mod fighter;
pub mod hitbox;
pub mod knockback;
pub mod poise;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::ai::*;
    pub use crate::combo::*;
    pub use crate::config::*;
    pub use crate::counter::*;
    pub use crate::damage::*;
    pub use crate::engine::*;
    pub use crate::fighter::*;
    pub use crate::hitbox::*;
    pub use crate::knockback::*;
    pub use crate::poise::*;
}

pub use prelude::*;

#[cfg(test)]
mod tests {
    use super::*;
    use brawl_common::{FighterId, Vec2};

    #[test]
    fn test_engine_and_ai_share_fighters() {
        let config = CombatConfig::default();
        let mut engine = CombatEngine::new(config.clone());
        let mut ai = TacticalAI::new(config.ai.clone(), 3);

        let a = FighterId::new(1);
        let b = FighterId::new(2);
        ai.initialize_ai(a, Difficulty::Legendary, Personality::Balanced);

        let fighters = vec![
            Fighter::new(a, 0, Vec2::ZERO),
            Fighter::new(b, 1, Vec2::new(1000.0, 0.0)),
        ];
        engine.update(16.0);
        let assess = ai.default_assessment();
        let action = ai.update(a, engine.now_ms(), &fighters, &assess);
        assert!(action.direction.length() <= 1.0 + 1e-5);
        assert_eq!(
            ai.get_ai_state(a).and_then(|state| state.last_decision_ms),
            Some(16)
        );
        assert!(engine.process_attack(&fighters[0], &fighters[1]).is_none());
    }
}
