//! Game tuning values
//!
//! Loaded from JSON; every section falls back to the shipped defaults so a
//! tuning file only needs the fields it changes.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Color;
use crate::consts::NUM_PLAYERS;
use crate::error::ConfigError;
use crate::sim::curve::BoostCurve;

/// Movement and boost parameters shared by both snails
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnailTuning {
    /// Forward speed (units per second)
    pub move_speed: f32,
    /// Turn rate at full input (radians per second)
    pub turn_speed: f32,
    /// Longest a boost can last (seconds)
    pub max_boost_duration: f32,
    /// Discrete charge levels in the boost gauge
    pub boost_steps: u32,
    /// Time to refill the gauge from empty (seconds)
    pub boost_recovery_time: f32,
    /// Speed multiplier keyed by normalized boost time
    pub boost_curve: BoostCurve,
    /// Distance from the snail's center back to where slime is laid
    pub trail_origin_offset: f32,
}

impl Default for SnailTuning {
    fn default() -> Self {
        Self {
            move_speed: 1.0,
            turn_speed: std::f32::consts::FRAC_PI_2,
            max_boost_duration: 1.0,
            boost_steps: 4,
            boost_recovery_time: 2.0,
            boost_curve: BoostCurve::default(),
            trail_origin_offset: 0.2,
        }
    }
}

/// Trail decay parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailTuning {
    /// Seconds a sample survives before expiring
    pub point_lifetime: f32,
    /// Chance a new sample also drops a cosmetic splat
    pub splat_probability: f32,
}

impl Default for TrailTuning {
    fn default() -> Self {
        Self {
            point_lifetime: 1.0,
            splat_probability: 0.1,
        }
    }
}

/// Round sequencing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchTuning {
    /// Rounds per match
    pub num_rounds: u32,
    /// Result display time after a crash (seconds)
    pub round_wait: f32,
    /// Delay before motion on match start, and result display before the menu
    pub reset_wait: f32,
    /// Delay before motion when a follow-up round starts
    pub next_round_delay: f32,
}

impl Default for MatchTuning {
    fn default() -> Self {
        Self {
            num_rounds: 3,
            round_wait: 2.0,
            reset_wait: 2.0,
            next_round_delay: 0.0,
        }
    }
}

/// Per-player start pose and color
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerTuning {
    pub color: Color,
    pub start_position: Vec2,
    /// Start orientation (radians, 0 = facing +Y)
    pub start_orientation: f32,
}

/// Complete tuning set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub snail: SnailTuning,
    pub trail: TrailTuning,
    pub rounds: MatchTuning,
    pub players: [PlayerTuning; NUM_PLAYERS],
    /// Color for draws and ties
    pub neutral_color: Color,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            snail: SnailTuning::default(),
            trail: TrailTuning::default(),
            rounds: MatchTuning::default(),
            players: [
                PlayerTuning {
                    color: [0.35, 0.85, 0.3, 1.0],
                    start_position: Vec2::new(-3.0, 0.0),
                    start_orientation: 0.0,
                },
                PlayerTuning {
                    color: [0.85, 0.3, 0.75, 1.0],
                    start_position: Vec2::new(3.0, 0.0),
                    start_orientation: std::f32::consts::PI,
                },
            ],
            neutral_color: [0.9, 0.9, 0.9, 1.0],
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a JSON tuning file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values that would make decay, charge or round timing undefined
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.snail.validate()?;
        self.trail.validate()?;
        self.rounds.validate()?;
        for player in &self.players {
            if !player.start_position.is_finite() || !player.start_orientation.is_finite() {
                return Err(ConfigError::invalid(
                    "players.start_position",
                    "start pose must be finite",
                ));
            }
        }
        Ok(())
    }
}

fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be > 0, got {value}")))
    }
}

fn require_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be >= 0, got {value}")))
    }
}

impl SnailTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_negative("snail.move_speed", self.move_speed)?;
        require_non_negative("snail.turn_speed", self.turn_speed)?;
        require_positive("snail.max_boost_duration", self.max_boost_duration)?;
        require_positive("snail.boost_recovery_time", self.boost_recovery_time)?;
        require_non_negative("snail.trail_origin_offset", self.trail_origin_offset)?;
        if self.boost_steps == 0 {
            return Err(ConfigError::invalid("snail.boost_steps", "must be at least 1"));
        }
        self.boost_curve.validate()
    }
}

impl TrailTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("trail.point_lifetime", self.point_lifetime)?;
        if !(0.0..=1.0).contains(&self.splat_probability) {
            return Err(ConfigError::invalid(
                "trail.splat_probability",
                format!("must be within [0, 1], got {}", self.splat_probability),
            ));
        }
        Ok(())
    }
}

impl MatchTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_rounds == 0 {
            return Err(ConfigError::invalid("rounds.num_rounds", "must be at least 1"));
        }
        require_non_negative("rounds.round_wait", self.round_wait)?;
        require_non_negative("rounds.reset_wait", self.reset_wait)?;
        require_non_negative("rounds.next_round_delay", self.next_round_delay)
    }
}
