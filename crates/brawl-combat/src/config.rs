//! Balance table for the combat core.
//!
//! Every tunable number the resolution pipeline uses lives here, grouped by
//! subsystem. Tables can be loaded from TOML or RON; fields missing from a
//! file keep their defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use crate::ai::Difficulty;
use crate::hitbox::DamageType;

/// Errors raised while loading a balance table.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML syntax or schema error
    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
    /// RON syntax or schema error
    #[error("failed to parse RON config: {0}")]
    Ron(#[from] ron::error::SpannedError),
    /// Values parse but break an invariant
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Per-damage-type scalar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageTypeTable {
    /// Scalar for physical hits
    pub physical: f32,
    /// Scalar for energy hits
    pub energy: f32,
    /// Scalar for special hits
    pub special: f32,
}

impl DamageTypeTable {
    /// Looks up the scalar for a damage type.
    #[must_use]
    pub fn get(&self, damage_type: DamageType) -> f32 {
        match damage_type {
            DamageType::Physical => self.physical,
            DamageType::Energy => self.energy,
            DamageType::Special => self.special,
        }
    }
}

impl Default for DamageTypeTable {
    fn default() -> Self {
        Self {
            physical: 1.0,
            energy: 0.9,
            special: 1.2,
        }
    }
}

/// Poise damage scalar per damage type.
///
/// Kept apart from [`DamageTypeTable`] so a partial table falls back to the
/// poise defaults, not the damage ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoiseTypeFactors {
    /// Scalar for physical hits
    pub physical: f32,
    /// Scalar for energy hits
    pub energy: f32,
    /// Scalar for special hits
    pub special: f32,
}

impl PoiseTypeFactors {
    /// Looks up the scalar for a damage type.
    #[must_use]
    pub fn get(&self, damage_type: DamageType) -> f32 {
        match damage_type {
            DamageType::Physical => self.physical,
            DamageType::Energy => self.energy,
            DamageType::Special => self.special,
        }
    }
}

impl Default for PoiseTypeFactors {
    fn default() -> Self {
        Self {
            physical: 1.2,
            energy: 0.8,
            special: 1.5,
        }
    }
}

/// Combo tracking parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    /// Gap (ms) after which a combo drops.
    pub reset_time_ms: u64,
    /// Multiplier gained per hit after the first.
    pub scaling: f32,
    /// Multiplier cap.
    pub max_multiplier: f32,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            reset_time_ms: 1000,
            scaling: 0.1,
            max_multiplier: 2.0,
        }
    }
}

/// Counter and parry window parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Length of a counter window in frames.
    pub counter_frames: u64,
    /// Length of a parry window in frames.
    pub parry_frames: u64,
    /// Offset from a perfect parry to the bonus counter window.
    pub perfect_parry_bonus_frames: u64,
    /// Damage scalar for a counter hit.
    pub counter_multiplier: f32,
    /// Damage scalar for a reflected parry. Never below `counter_multiplier`.
    pub parry_multiplier: f32,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            counter_frames: 10,
            parry_frames: 5,
            perfect_parry_bonus_frames: 2,
            counter_multiplier: 1.5,
            parry_multiplier: 2.0,
        }
    }
}

/// Damage application parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageConfig {
    /// Hard cap for accumulated damage percent.
    pub max_damage: f32,
    /// Entries kept in each fighter's recent damage history.
    pub history_len: usize,
    /// Damage scalar per damage type.
    pub type_multipliers: DamageTypeTable,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            max_damage: 999.0,
            history_len: 10,
            type_multipliers: DamageTypeTable::default(),
        }
    }
}

/// Knockback, hitstun and hitlag coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnockbackConfig {
    /// Global knockback scalar.
    pub base_multiplier: f32,
    /// Rage multiplier reached at 100% attacker damage.
    pub rage_max: f32,
    /// Maximum DI deflection in degrees.
    pub di_strength: f32,
    /// Scalar applied to the clamped DI deflection.
    pub di_multiplier: f32,
    /// Hitstun frames before knockback scaling.
    pub hitstun_base: f32,
    /// Hitstun frames per knockback unit.
    pub hitstun_multiplier: f32,
    /// Hitlag frames before damage scaling.
    pub hitlag_base: f32,
    /// Hitlag frames per damage unit.
    pub hitlag_multiplier: f32,
    /// Extra hitlag factor on the defender side.
    pub defender_hitlag_factor: f32,
    /// Hitlag cap in frames.
    pub hitlag_max: u32,
    /// Knockback above which a hit tumbles.
    pub tumble_knockback: f32,
    /// Damage above which a hit tumbles.
    pub tumble_damage: f32,
    /// Knockback above which a hit may launch.
    pub launch_knockback: f32,
    /// Damage above which a hit may launch.
    pub launch_damage: f32,
}

impl Default for KnockbackConfig {
    fn default() -> Self {
        Self {
            base_multiplier: 1.0,
            rage_max: 1.15,
            di_strength: 15.0,
            di_multiplier: 1.0,
            hitstun_base: 4.0,
            hitstun_multiplier: 0.4,
            hitlag_base: 4.0,
            hitlag_multiplier: 0.35,
            defender_hitlag_factor: 1.5,
            hitlag_max: 20,
            tumble_knockback: 80.0,
            tumble_damage: 100.0,
            launch_knockback: 120.0,
            launch_damage: 150.0,
        }
    }
}

/// Poise and stagger parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoiseConfig {
    /// Poise pool for fighters without an explicit value.
    pub default_max_poise: f32,
    /// Regen rate for fighters without an explicit value.
    pub default_regen_rate: f32,
    /// Time without hits (ms) before poise regenerates.
    pub regen_delay_ms: u64,
    /// Effective damage below which a healthy fighter armors through.
    pub flinch_threshold: f32,
    /// Effective damage at or above which a broken fighter staggers.
    pub stagger_threshold: f32,
    /// Effective damage at or above which a broken fighter launches.
    pub launch_threshold: f32,
    /// Poise fraction above which super armor is possible.
    pub super_armor_ratio: f32,
    /// Stagger frames before effective damage scaling.
    pub stagger_base_frames: u32,
    /// Stagger frame cap.
    pub stagger_max_frames: u32,
    /// Effective damage scalar per damage type.
    pub type_factors: PoiseTypeFactors,
}

impl Default for PoiseConfig {
    fn default() -> Self {
        Self {
            default_max_poise: 100.0,
            default_regen_rate: 10.0,
            regen_delay_ms: 1000,
            flinch_threshold: 5.0,
            stagger_threshold: 15.0,
            launch_threshold: 30.0,
            super_armor_ratio: 0.5,
            stagger_base_frames: 20,
            stagger_max_frames: 60,
            type_factors: PoiseTypeFactors::default(),
        }
    }
}

/// Accuracy per difficulty level, in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccuracyTable {
    /// Easy
    pub easy: f32,
    /// Medium
    pub medium: f32,
    /// Hard
    pub hard: f32,
    /// Expert
    pub expert: f32,
    /// Legendary
    pub legendary: f32,
}

impl AccuracyTable {
    /// Accuracy for a difficulty level.
    #[must_use]
    pub fn get(&self, difficulty: Difficulty) -> f32 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
            Difficulty::Expert => self.expert,
            Difficulty::Legendary => self.legendary,
        }
    }

    fn values(&self) -> [f32; 5] {
        [self.easy, self.medium, self.hard, self.expert, self.legendary]
    }
}

impl Default for AccuracyTable {
    fn default() -> Self {
        Self {
            easy: 0.5,
            medium: 0.7,
            hard: 0.85,
            expert: 0.9,
            legendary: 0.95,
        }
    }
}

/// Tactical AI parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Minimum time between decisions (ms).
    pub update_interval_ms: u64,
    /// Health fraction below which non-aggressive fighters retreat.
    pub low_health_ratio: f32,
    /// Distance below which the AI pressures its target.
    pub pressure_range: f32,
    /// Distance above which the AI always approaches.
    pub approach_range: f32,
    /// Minimum angle (degrees) between attack lanes before flanking.
    pub flank_angle_deg: f32,
    /// Distance of the computed retreat point.
    pub retreat_distance: f32,
    /// Horizontal offset from the target when flanking.
    pub flank_offset: f32,
    /// Damage above which a target counts as vulnerable.
    pub vulnerable_damage: f32,
    /// Decision accuracy per difficulty.
    pub accuracy: AccuracyTable,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 100,
            low_health_ratio: 0.3,
            pressure_range: 200.0,
            approach_range: 500.0,
            flank_angle_deg: 60.0,
            retreat_distance: 500.0,
            flank_offset: 150.0,
            vulnerable_damage: 100.0,
            accuracy: AccuracyTable::default(),
        }
    }
}

/// Complete balance table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Combo tracking
    pub combo: ComboConfig,
    /// Counter and parry windows
    pub counter: CounterConfig,
    /// Damage application
    pub damage: DamageConfig,
    /// Knockback formula
    pub knockback: KnockbackConfig,
    /// Poise and stagger
    pub poise: PoiseConfig,
    /// Tactical AI
    pub ai: AiConfig,
}

impl CombatConfig {
    /// Parses and validates a TOML balance table.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a RON balance table.
    pub fn from_ron_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a balance table, picking the format from the file extension.
    /// Anything other than `.ron` is read as TOML.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let config = match path.extension().and_then(|ext| ext.to_str()) {
            Some("ron") => Self::from_ron_str(&contents)?,
            _ => Self::from_toml_str(&contents)?,
        };
        info!("Loaded combat config from {}", path.display());
        Ok(config)
    }

    /// Loads a balance table, falling back to defaults if it is missing or invalid.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("Combat config {} not found, using defaults", path.display());
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load combat config: {e}");
                Self::default()
            },
        }
    }

    /// Serializes the table as pretty TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Checks cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.counter.parry_multiplier < self.counter.counter_multiplier {
            return Err(ConfigError::Invalid(format!(
                "parry multiplier {} is below counter multiplier {}",
                self.counter.parry_multiplier, self.counter.counter_multiplier
            )));
        }
        if self.combo.max_multiplier < 1.0 {
            return Err(ConfigError::Invalid(
                "combo max multiplier must be at least 1.0".to_string(),
            ));
        }
        if self.damage.max_damage <= 0.0 {
            return Err(ConfigError::Invalid("max damage must be positive".to_string()));
        }
        if self.ai.update_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "AI update interval must be positive".to_string(),
            ));
        }
        if self
            .ai
            .accuracy
            .values()
            .iter()
            .any(|a| !(0.0..=1.0).contains(a))
        {
            return Err(ConfigError::Invalid(
                "AI accuracy must lie in [0, 1]".to_string(),
            ));
        }
        let poise = &self.poise;
        if !(poise.flinch_threshold <= poise.stagger_threshold
            && poise.stagger_threshold <= poise.launch_threshold)
        {
            return Err(ConfigError::Invalid(
                "poise thresholds must be ordered flinch <= stagger <= launch".to_string(),
            ));
        }
        Ok(())
    }
}
