//! Headless 1v1 arena.
//!
//! Player one follows a fixed script: walk in, jab, smash, and parry on a
//! rhythm. Player two is driven by the tactical AI. Both share a flat stage
//! with blast zones on every side; leaving one costs a stock.

use brawl_combat::prelude::*;
use brawl_common::{FighterId, Vec2};
use serde::Serialize;
use tracing::{debug, info};

/// Scripted fighter.
pub const PLAYER: FighterId = FighterId::new(1);
/// AI-controlled fighter.
pub const CPU: FighterId = FighterId::new(2);

const WALK_SPEED: f32 = 0.25;
const DASH_FACTOR: f32 = 2.0;
const GRAVITY: f32 = 0.002;
const AIR_DRAG: f32 = 0.92;
const KNOCKBACK_TO_VELOCITY: f32 = 0.012;
const ATTACK_COOLDOWN_FRAMES: u32 = 20;
const BLAST_X: f32 = 900.0;
const BLAST_TOP: f32 = -700.0;
const STAGE_HALF_WIDTH: f32 = 500.0;

/// Arena settings.
#[derive(Debug, Clone)]
pub struct SimOptions {
    /// Seed for the AI's decision noise
    pub seed: u64,
    /// Hard stop for the match
    pub max_ticks: u64,
    /// Fixed tick length
    pub tick_ms: f32,
    /// CPU skill
    pub difficulty: Difficulty,
    /// CPU temperament
    pub personality: Personality,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            seed: 0x00B2_A3CE,
            max_ticks: 60 * 60 * 3,
            tick_ms: 1000.0 / 60.0,
            difficulty: Difficulty::Hard,
            personality: Personality::Balanced,
        }
    }
}

/// Match statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchSummary {
    /// Ticks simulated
    pub ticks: u64,
    /// Hits landed by either fighter
    pub hits: u32,
    /// Parried hits
    pub parries: u32,
    /// Counter hits
    pub counters: u32,
    /// Stocks lost per fighter, player first
    pub stocks_lost: [u32; 2],
    /// Damage percent at the end, player first
    pub final_damage: [f32; 2],
    /// Longest combo per fighter, player first
    pub best_combo: [u32; 2],
    /// Winner, if the match was decided
    pub winner: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Move {
    Jab,
    Smash,
}

impl Move {
    fn from_attack(attack: AttackKind) -> Self {
        match attack {
            AttackKind::Light | AttackKind::Grab => Self::Jab,
            AttackKind::Heavy | AttackKind::Special => Self::Smash,
        }
    }

    /// Attack box in world space for a fighter standing at `position`.
    fn hitbox(self, owner: FighterId, position: Vec2, facing: Facing) -> Hitbox {
        let (reach, width, hitbox) = match self {
            Self::Jab => (
                10.0,
                35.0,
                Hitbox::attack(owner, Rect::default())
                    .with_damage(4.0)
                    .with_knockback(12.0, 0.4)
                    .with_angle(30.0)
                    .with_priority(1),
            ),
            Self::Smash => (
                15.0,
                45.0,
                Hitbox::attack(owner, Rect::default())
                    .with_damage(17.0)
                    .with_knockback(30.0, 1.1)
                    .with_angle(42.0)
                    .with_frames(0, 6)
                    .with_priority(2),
            ),
        };
        // Horizontal distance from the fighter's origin to the box center.
        let near_edge = reach + width / 2.0;
        let center = Vec2::new(facing.sign() * near_edge, -23.0);
        Hitbox {
            bounds: Rect::from_center(center, width / 2.0, 7.0).translated(position),
            ..hitbox
        }
    }
}

fn hurtbox(owner: FighterId, position: Vec2) -> Hitbox {
    Hitbox::hurtbox(owner, Rect::from_center(position, 15.0, 20.0).translated(Vec2::UP * 20.0))
}

#[derive(Debug, Default, Clone, Copy)]
struct Timers {
    hitstun: u32,
    cooldown: u32,
}

/// A running match.
#[derive(Debug)]
pub struct Arena {
    engine: CombatEngine,
    ai: TacticalAI,
    assess: DamageThreshold,
    fighters: [Fighter; 2],
    spawns: [Vec2; 2],
    timers: [Timers; 2],
    options: SimOptions,
    summary: MatchSummary,
}

impl Arena {
    /// Sets up both fighters at their spawn points.
    #[must_use]
    pub fn new(config: CombatConfig, options: SimOptions) -> Self {
        let mut ai = TacticalAI::new(config.ai.clone(), options.seed);
        ai.initialize_ai(CPU, options.difficulty, options.personality);
        let assess = ai.default_assessment();

        let spawns = [Vec2::new(-200.0, 0.0), Vec2::new(200.0, 0.0)];
        let fighters = [
            Fighter::new(PLAYER, 0, spawns[0]),
            Fighter::new(CPU, 1, spawns[1]).with_facing(Facing::Left),
        ];

        Self {
            engine: CombatEngine::new(config),
            ai,
            assess,
            fighters,
            spawns,
            timers: [Timers::default(); 2],
            options,
            summary: MatchSummary::default(),
        }
    }

    /// Runs ticks until a fighter runs out of stocks or time runs out.
    pub fn run(&mut self) -> MatchSummary {
        while self.summary.ticks < self.options.max_ticks && self.winner().is_none() {
            self.step();
        }
        self.finish()
    }

    /// Advances the match by one tick.
    pub fn step(&mut self) {
        self.engine.update(self.options.tick_ms);
        self.summary.ticks += 1;
        let frame = self.engine.current_frame();
        let now = self.engine.now_ms();

        self.face_each_other();

        let player_move = if self.timers[0].hitstun == 0 {
            self.script(frame)
        } else {
            None
        };
        let cpu_move = if self.timers[1].hitstun == 0 {
            let action = self.ai.update(CPU, now, &self.fighters, &self.assess);
            self.apply_action(&action)
        } else {
            None
        };

        let moves = [player_move, cpu_move];
        for (index, chosen) in moves.iter().enumerate() {
            self.rebuild_boxes(index, *chosen);
        }

        // Trades resolve the higher priority attack first; a fighter knocked
        // into hitstun by it loses their own swing.
        let order = if self.attack_priority(1) > self.attack_priority(0) {
            [1, 0]
        } else {
            [0, 1]
        };
        for index in order {
            if moves[index].is_none() || self.timers[index].hitstun > 0 {
                continue;
            }
            let other = 1 - index;
            if let Some(result) = self
                .engine
                .process_attack(&self.fighters[index], &self.fighters[other])
            {
                self.land(&result);
            }
        }

        self.integrate();
        for timers in &mut self.timers {
            timers.hitstun = timers.hitstun.saturating_sub(1);
            timers.cooldown = timers.cooldown.saturating_sub(1);
        }
    }

    fn face_each_other(&mut self) {
        let [player, cpu] = &mut self.fighters;
        if player.position.x <= cpu.position.x {
            player.facing = Facing::Right;
            cpu.facing = Facing::Left;
        } else {
            player.facing = Facing::Left;
            cpu.facing = Facing::Right;
        }
    }

    /// Player one's fixed routine.
    fn script(&mut self, frame: u64) -> Option<Move> {
        let gap = self.fighters[1].position.x - self.fighters[0].position.x;
        if frame % 45 == 0 {
            self.engine.start_parry_window(PLAYER);
        }
        if gap.abs() > 35.0 {
            self.fighters[0].position.x += gap.signum() * WALK_SPEED * self.options.tick_ms;
        }
        let chosen = if frame % 120 == 60 && gap.abs() < 70.0 {
            Some(Move::Smash)
        } else if frame % 24 == 0 && gap.abs() < 55.0 {
            Some(Move::Jab)
        } else {
            None
        };
        self.start_attack(0, chosen)
    }

    /// Applies the CPU's action and returns the attack it throws, if any.
    fn apply_action(&mut self, action: &AIAction) -> Option<Move> {
        let mut speed = WALK_SPEED * self.options.tick_ms;
        if action.has_modifier(ActionModifier::Dash) {
            speed *= DASH_FACTOR;
        }
        if action.has_modifier(ActionModifier::Counter) {
            self.engine.start_counter_window(CPU);
        }
        self.fighters[1].position.x += action.direction.x * speed;
        debug!(?action, "cpu action");
        self.start_attack(1, action.attack.map(Move::from_attack))
    }

    fn start_attack(&mut self, index: usize, chosen: Option<Move>) -> Option<Move> {
        let chosen = chosen?;
        if self.timers[index].cooldown > 0 {
            return None;
        }
        self.timers[index].cooldown = ATTACK_COOLDOWN_FRAMES;
        Some(chosen)
    }

    fn rebuild_boxes(&mut self, index: usize, chosen: Option<Move>) {
        let fighter = &mut self.fighters[index];
        fighter.hitboxes.clear();
        let id = fighter.id;
        let position = fighter.position;
        let facing = fighter.facing;
        fighter.hitboxes.push(hurtbox(id, position));
        if let Some(chosen) = chosen {
            fighter.hitboxes.push(chosen.hitbox(id, position, facing));
        }
    }

    fn attack_priority(&self, index: usize) -> Option<u8> {
        self.fighters[index]
            .active_boxes(HitboxKind::Hitbox)
            .map(|h| h.priority)
            .max()
    }

    fn land(&mut self, result: &HitResult) {
        let Some(index) = self.index_of(result.defender) else {
            return;
        };
        let damage = self
            .engine
            .apply_hit_result(&mut self.fighters[index], result);
        let defender = &mut self.fighters[index];
        defender.body.velocity = result.knockback * KNOCKBACK_TO_VELOCITY;
        defender.body.is_grounded = false;
        self.timers[index].hitstun = result.hitstun;

        self.summary.hits += 1;
        self.summary.parries += u32::from(result.was_parry);
        self.summary.counters += u32::from(result.was_counter);

        info!(
            frame = self.engine.current_frame(),
            attacker = %result.attacker,
            defender = %result.defender,
            damage = result.damage,
            total = damage,
            knockback_x = result.knockback.x,
            knockback_y = result.knockback.y,
            hitstun = result.hitstun,
            reaction = ?result.reaction.kind,
            parry = result.was_parry,
            counter = result.was_counter,
            "hit"
        );
    }

    fn integrate(&mut self) {
        let dt = self.options.tick_ms;
        for index in 0..self.fighters.len() {
            let fighter = &mut self.fighters[index];
            let body = &mut fighter.body;
            if !body.is_grounded {
                body.velocity.y += GRAVITY * dt;
            }
            fighter.position += body.velocity * dt;
            body.velocity *= AIR_DRAG;

            let on_stage = fighter.position.x.abs() <= STAGE_HALF_WIDTH;
            if on_stage && fighter.position.y >= 0.0 {
                fighter.position.y = 0.0;
                body.velocity.y = 0.0;
                body.is_grounded = true;
            } else {
                body.is_grounded = false;
            }

            let out = fighter.position.x.abs() > BLAST_X
                || fighter.position.y < BLAST_TOP
                || fighter.position.y > -BLAST_TOP;
            if out {
                self.knock_out(index);
            }
        }
    }

    fn knock_out(&mut self, index: usize) {
        let other = 1 - index;
        let id = self.fighters[index].id;
        let fighter = &mut self.fighters[index];
        fighter.stats.lives = fighter.stats.lives.saturating_sub(1);
        fighter.stats.current_damage = 0.0;
        fighter.position = self.spawns[index];
        fighter.body = RigidBody::default();
        let lives = fighter.stats.lives;

        self.summary.stocks_lost[index] += 1;
        self.timers[index] = Timers::default();
        self.engine.reset_poise(id);
        let scorer = self.fighters[other].id;
        if let Some(combo) = self.engine.end_combo(scorer) {
            debug!(%scorer, hits = combo.hits, "combo ended by KO");
        }
        info!(fighter = %id, lives, "KO");
    }

    fn index_of(&self, id: FighterId) -> Option<usize> {
        self.fighters.iter().position(|f| f.id == id)
    }

    fn winner(&self) -> Option<FighterId> {
        let [player, cpu] = &self.fighters;
        if player.stats.lives == 0 {
            Some(cpu.id)
        } else if cpu.stats.lives == 0 {
            Some(player.id)
        } else {
            None
        }
    }

    fn finish(&mut self) -> MatchSummary {
        let winner = self.winner().or_else(|| {
            // Time out: more stocks wins, then lower damage.
            let [player, cpu] = &self.fighters;
            let key = |f: &Fighter| (f.stats.lives, -(f.stats.current_damage as i64));
            match key(player).cmp(&key(cpu)) {
                std::cmp::Ordering::Greater => Some(player.id),
                std::cmp::Ordering::Less => Some(cpu.id),
                std::cmp::Ordering::Equal => None,
            }
        });

        for (index, fighter) in self.fighters.iter().enumerate() {
            self.summary.final_damage[index] = fighter.stats.current_damage;
            let best = self.engine.best_combo(fighter.id).map_or(0, |c| c.hits);
            let current = self
                .engine
                .get_combo(fighter.id)
                .map_or(0, |c| c.hits);
            self.summary.best_combo[index] = best.max(current);
        }
        self.summary.winner = winner.map(FighterId::raw);
        self.engine.reset_all();
        self.summary.clone()
    }
}
