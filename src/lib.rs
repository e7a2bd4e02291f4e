//! Slime Yard - a 1v1 snail arena game
//!
//! Core modules:
//! - `sim`: Fixed-step simulation (trails, territory shapes, snails, rounds)
//! - `sinks`: Collaborator interfaces (boundary, territory, presentation, cues)
//! - `audio`: Sound effect identifiers fired by the simulation
//! - `tuning`: Data-driven game balance
//! - `error`: Configuration and shape extraction errors

pub mod audio;
pub mod error;
pub mod sim;
pub mod sinks;
pub mod tuning;

pub use error::{ConfigError, ShapeError};
pub use tuning::Tuning;

use glam::Vec2;
use serde::Serialize;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Number of snails in the arena
    pub const NUM_PLAYERS: usize = 2;

    /// Minimum distance the trail origin must travel before a new sample is laid
    pub const POINT_THRESHOLD: f32 = 0.15;
    /// Trailing samples (plus one) excluded from the re-entry search
    pub const MIN_SHAPE_POINT_COUNT: usize = 5;
    /// Fewest vertices a territory polygon may have
    pub const MIN_POLYGON_POINTS: usize = 3;

    /// Weight of the boost multiplier applied to turning
    pub const BOOST_TURN_WEIGHT: f32 = 0.5;
}

/// RGBA color, components in [0, 1]
pub type Color = [f32; 4];

/// One of the two competing players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub const ALL: [Player; consts::NUM_PLAYERS] = [Player::One, Player::Two];

    /// Array index of this player (0 or 1)
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }

    /// The opposing player
    #[inline]
    pub fn other(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Player::One => f.write_str("Player1"),
            Player::Two => f.write_str("Player2"),
        }
    }
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Forward unit vector for an orientation (0 = facing +Y, counter-clockwise positive)
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(-angle.sin(), angle.cos())
}
