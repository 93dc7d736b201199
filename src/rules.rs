//! Tunable game rules, loaded once from JSON before the engine starts.
//!
//! Every field is required: a missing key is a parse error and an
//! out-of-range value is a validation error.  There are no defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::RulesError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rules {
    pub starting_lives: u32,
    pub difficulty: Difficulty,
    /// Global multiplier applied to every regular alien's velocity.
    pub alien_speed: f32,
    pub alien_hp: AlienHp,
    pub points: Points,
    pub nuke_threshold: u32,
    pub rapid_fire_threshold: u32,
    /// Seconds of rapid fire per award.
    pub rapid_fire_duration: f32,
    /// Frames between shots without rapid fire.
    pub normal_fire_cooldown: u32,
    pub buildings: BuildingRange,
    pub phantom_alien: PhantomRules,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Difficulty {
    pub score_per_level: u32,
    pub spawn_interval_start: u32,
    pub spawn_interval_min: u32,
    pub spawn_interval_step: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlienHp {
    pub normal: u32,
    pub tough: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Points {
    pub normal_alien: u32,
    pub tough_alien: u32,
    pub small_alien_bonus: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingRange {
    pub min: usize,
    pub max: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhantomRules {
    pub min_speed: f32,
    pub max_speed: f32,
    pub hp: u32,
    pub score_threshold: u32,
    pub bonus_score: u32,
}

fn invalid(field: &'static str, reason: impl Into<String>) -> RulesError {
    RulesError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn require_positive(field: &'static str, value: u32) -> Result<(), RulesError> {
    if value == 0 {
        return Err(invalid(field, "must be greater than zero"));
    }
    Ok(())
}

fn require_positive_f32(field: &'static str, value: f32) -> Result<(), RulesError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field, format!("must be a positive number, got {value}")));
    }
    Ok(())
}

impl Rules {
    /// Read, parse and validate a rules file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RulesError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let rules = Self::from_json_str(&text)?;
        info!(path = %path.display(), "loaded game rules");
        Ok(rules)
    }

    /// Parse and validate rules from a JSON document.
    pub fn from_json_str(text: &str) -> Result<Self, RulesError> {
        let rules: Rules = serde_json::from_str(text)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Check the ranges and orderings the engine relies on.
    pub fn validate(&self) -> Result<(), RulesError> {
        require_positive("startingLives", self.starting_lives)?;

        let d = &self.difficulty;
        require_positive("difficulty.scorePerLevel", d.score_per_level)?;
        require_positive("difficulty.spawnIntervalMin", d.spawn_interval_min)?;
        if d.spawn_interval_start < d.spawn_interval_min {
            return Err(invalid(
                "difficulty.spawnIntervalStart",
                format!(
                    "{} is below spawnIntervalMin {}",
                    d.spawn_interval_start, d.spawn_interval_min
                ),
            ));
        }

        require_positive_f32("alienSpeed", self.alien_speed)?;
        require_positive("alienHp.normal", self.alien_hp.normal)?;
        require_positive("alienHp.tough", self.alien_hp.tough)?;
        require_positive("nukeThreshold", self.nuke_threshold)?;
        require_positive("rapidFireThreshold", self.rapid_fire_threshold)?;
        require_positive_f32("rapidFireDuration", self.rapid_fire_duration)?;

        if self.buildings.min == 0 {
            return Err(invalid("buildings.min", "a city needs at least one building"));
        }
        if self.buildings.max < self.buildings.min {
            return Err(invalid(
                "buildings.max",
                format!("{} is below buildings.min {}", self.buildings.max, self.buildings.min),
            ));
        }

        let p = &self.phantom_alien;
        require_positive_f32("phantomAlien.minSpeed", p.min_speed)?;
        require_positive_f32("phantomAlien.maxSpeed", p.max_speed)?;
        if p.max_speed < p.min_speed {
            return Err(invalid(
                "phantomAlien.maxSpeed",
                format!("{} is below minSpeed {}", p.max_speed, p.min_speed),
            ));
        }
        require_positive("phantomAlien.hp", p.hp)?;
        require_positive("phantomAlien.scoreThreshold", p.score_threshold)?;

        Ok(())
    }

    /// Spawn interval (frames) for a given difficulty level.
    pub fn spawn_interval_for(&self, level: u32) -> u32 {
        let d = &self.difficulty;
        d.spawn_interval_start
            .saturating_sub(level.saturating_mul(d.spawn_interval_step))
            .max(d.spawn_interval_min)
    }
}
