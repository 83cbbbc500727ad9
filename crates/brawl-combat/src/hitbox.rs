//! Hitbox and hurtbox registry with axis-aligned overlap tests.
//!
//! Volumes are world-space snapshots pushed in by the animation layer each
//! tick. The registry never moves or ages them; it only stores, toggles and
//! queries.

use brawl_common::{FighterId, HitboxId, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Role of a collision volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitboxKind {
    /// Deals damage.
    Hitbox,
    /// Receives damage.
    Hurtbox,
    /// Grab range.
    Grabbox,
    /// Projectile body.
    Projectile,
}

/// Damage classification of an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DamageType {
    /// Strikes and weapons.
    #[default]
    Physical,
    /// Beams and blasts.
    Energy,
    /// Supers and signature moves.
    Special,
}

/// Axis-aligned rectangle stored as origin plus extent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub w: f32,
    /// Height
    pub h: f32,
}

impl Rect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Creates a rectangle from its center and half-extents.
    #[must_use]
    pub fn from_center(center: Vec2, half_width: f32, half_height: f32) -> Self {
        Self {
            x: center.x - half_width,
            y: center.y - half_height,
            w: half_width * 2.0,
            h: half_height * 2.0,
        }
    }

    /// Returns the center of the rectangle.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Strict overlap: rectangles that only share an edge do not intersect.
    #[must_use]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }

    /// Intersection of two rectangles, if they overlap.
    #[must_use]
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.overlaps(other) {
            return None;
        }
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.w).min(other.x + other.w);
        let bottom = (self.y + self.h).min(other.y + other.h);
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Returns the rectangle translated by a vector.
    #[must_use]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            ..*self
        }
    }
}

/// A collision volume with the attack data it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    /// Volume ID
    pub id: HitboxId,
    /// Fighter the volume belongs to
    pub owner: FighterId,
    /// Role of the volume
    pub kind: HitboxKind,
    /// World-space bounds
    pub bounds: Rect,
    /// Whether the volume currently participates in collision
    pub active: bool,
    /// Raw damage dealt
    pub damage: f32,
    /// Knockback independent of percent
    pub base_knockback: f32,
    /// Knockback scaling with the defender's percent
    pub knockback_growth: f32,
    /// Launch angle in degrees, for a right-facing attacker
    pub angle: f32,
    /// Authored minimum hitstun frames
    pub hitstun: u32,
    /// Authored minimum hitlag frames
    pub hitlag: u32,
    /// Clash priority
    pub priority: u8,
    /// Damage classification
    pub damage_type: DamageType,
}

impl Hitbox {
    /// Creates an active, zero-damage volume of the given role.
    #[must_use]
    pub fn new(owner: FighterId, kind: HitboxKind, bounds: Rect) -> Self {
        Self {
            id: HitboxId::new(),
            owner,
            kind,
            bounds,
            active: true,
            damage: 0.0,
            base_knockback: 0.0,
            knockback_growth: 0.0,
            angle: 0.0,
            hitstun: 0,
            hitlag: 0,
            priority: 0,
            damage_type: DamageType::Physical,
        }
    }

    /// Creates a damage-dealing hitbox.
    #[must_use]
    pub fn attack(owner: FighterId, bounds: Rect) -> Self {
        Self::new(owner, HitboxKind::Hitbox, bounds)
    }

    /// Creates a hurtbox.
    #[must_use]
    pub fn hurtbox(owner: FighterId, bounds: Rect) -> Self {
        Self::new(owner, HitboxKind::Hurtbox, bounds)
    }

    /// Set damage.
    #[must_use]
    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    /// Set base knockback and growth.
    #[must_use]
    pub fn with_knockback(mut self, base: f32, growth: f32) -> Self {
        self.base_knockback = base;
        self.knockback_growth = growth;
        self
    }

    /// Set launch angle in degrees.
    #[must_use]
    pub fn with_angle(mut self, degrees: f32) -> Self {
        self.angle = degrees;
        self
    }

    /// Set authored hitstun and hitlag minimums.
    #[must_use]
    pub fn with_frames(mut self, hitstun: u32, hitlag: u32) -> Self {
        self.hitstun = hitstun;
        self.hitlag = hitlag;
        self
    }

    /// Set clash priority.
    #[must_use]
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Set damage type.
    #[must_use]
    pub fn with_damage_type(mut self, damage_type: DamageType) -> Self {
        self.damage_type = damage_type;
        self
    }

    /// Set active flag.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// Checks whether `attack` scores against `target`.
///
/// Only a `Hitbox` against another fighter's `Hurtbox` can score, whatever
/// the geometry.
#[must_use]
pub fn check_collision(attack: &Hitbox, target: &Hitbox) -> bool {
    attack.kind == HitboxKind::Hitbox
        && target.kind == HitboxKind::Hurtbox
        && attack.owner != target.owner
        && attack.bounds.overlaps(&target.bounds)
}

/// Finds the first scoring pair, scanning attacks in order and targets in order.
pub fn first_collision<'a, A, T>(attacks: A, targets: T) -> Option<(&'a Hitbox, &'a Hitbox)>
where
    A: IntoIterator<Item = &'a Hitbox>,
    T: IntoIterator<Item = &'a Hitbox> + Clone,
{
    attacks
        .into_iter()
        .filter(|h| h.active && h.kind == HitboxKind::Hitbox)
        .find_map(|attack| {
            targets
                .clone()
                .into_iter()
                .filter(|h| h.active && h.kind == HitboxKind::Hurtbox)
                .find(|target| check_collision(attack, target))
                .map(|target| (attack, target))
        })
}

/// Stores collision volumes for every fighter in a match.
#[derive(Debug, Default)]
pub struct HitboxRegistry {
    boxes: HashMap<HitboxId, Hitbox>,
    /// Insertion order, so queries are deterministic.
    order: Vec<HitboxId>,
}

impl HitboxRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored volumes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Checks if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Stores a volume, replacing any previous volume with the same ID.
    pub fn create_hitbox(&mut self, hitbox: Hitbox) -> HitboxId {
        let id = hitbox.id;
        if self.boxes.insert(id, hitbox).is_none() {
            self.order.push(id);
        }
        id
    }

    /// Removes a volume.
    pub fn remove_hitbox(&mut self, id: HitboxId) -> Option<Hitbox> {
        let removed = self.boxes.remove(&id)?;
        self.order.retain(|&other| other != id);
        Some(removed)
    }

    /// Toggles a volume. Returns false if the ID is unknown.
    pub fn set_active(&mut self, id: HitboxId, active: bool) -> bool {
        match self.boxes.get_mut(&id) {
            Some(hitbox) => {
                hitbox.active = active;
                true
            },
            None => false,
        }
    }

    /// Gets a volume by ID.
    #[must_use]
    pub fn get(&self, id: HitboxId) -> Option<&Hitbox> {
        self.boxes.get(&id)
    }

    fn iter(&self) -> impl Iterator<Item = &Hitbox> {
        self.order.iter().filter_map(|id| self.boxes.get(id))
    }

    /// All active volumes, in insertion order.
    #[must_use]
    pub fn get_active_hitboxes(&self) -> Vec<&Hitbox> {
        self.iter().filter(|h| h.active).collect()
    }

    /// All volumes of one role, active or not.
    #[must_use]
    pub fn get_by_type(&self, kind: HitboxKind) -> Vec<&Hitbox> {
        self.iter().filter(|h| h.kind == kind).collect()
    }

    /// All volumes owned by a fighter.
    #[must_use]
    pub fn get_by_owner(&self, owner: FighterId) -> Vec<&Hitbox> {
        self.iter().filter(|h| h.owner == owner).collect()
    }

    /// Removes every volume owned by a fighter.
    pub fn clear_owner(&mut self, owner: FighterId) {
        self.boxes.retain(|_, h| h.owner != owner);
        let boxes = &self.boxes;
        self.order.retain(|id| boxes.contains_key(id));
    }

    /// Removes every volume.
    pub fn clear(&mut self) {
        self.boxes.clear();
        self.order.clear();
    }

    /// First scoring pair between two fighters' registered volumes.
    #[must_use]
    pub fn check_registered(
        &self,
        attacker: FighterId,
        defender: FighterId,
    ) -> Option<(&Hitbox, &Hitbox)> {
        let attacks = self.get_by_owner(attacker);
        let targets = self.get_by_owner(defender);
        first_collision(attacks.iter().copied(), targets.iter().copied())
    }
}
