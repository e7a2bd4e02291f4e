//! Collaborator interfaces
//!
//! The simulation never looks anything up: every renderer, pool, HUD or audio
//! hook it talks to is handed in at construction through one of these traits.
//! All methods default to no-ops and `()` implements each trait, so callers
//! only override what they actually consume.

use glam::Vec2;

use crate::audio::SoundEffect;
use crate::sim::shape::TerritoryRegion;
use crate::sim::snail::ChargeLevel;
use crate::{Color, Player};

/// Receives a trail's polyline and its collidable flag whenever the trail changes
pub trait BoundarySink {
    /// Redraw the trail with these points (oldest first)
    fn redraw(&mut self, _points: &[Vec2]) {}
    /// Enable or disable the trail's collision edge
    fn set_collidable(&mut self, _enabled: bool) {}
}

/// Instantiates claimed territory; owns its own pooling
pub trait TerritorySink {
    fn materialize(&mut self, _region: &TerritoryRegion, _owner: Player, _color: Color) {}
    /// Release every materialized region (round start, menu)
    fn reset(&mut self) {}
}

/// HUD text, scores and boost gauges
pub trait PresentationSink {
    /// Size a player's boost gauge and tint their HUD; called once per player at startup
    fn setup(&mut self, _player: Player, _boost_steps: u32, _color: Color) {}
    fn round_text(&mut self, _text: &str) {}
    /// Show a centered message, or hide it with `None`
    fn info(&mut self, _message: Option<(&str, Color)>) {}
    fn scores(&mut self, _scores: [u32; 2]) {}
    fn boost_charge(&mut self, _player: Player, _level: ChargeLevel) {}
}

/// Fire-and-forget audio/animation/cosmetic triggers from a snail
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cue {
    Sound(SoundEffect),
    /// Drop a cosmetic slime splat that fades over `lifetime` seconds
    Splat { pos: Vec2, lifetime: f32 },
    /// Current turn input, for the body-bend animation
    Turn(f32),
    /// Play the death animation
    Dead,
}

pub trait CueSink {
    fn cue(&mut self, _cue: Cue) {}
}

impl BoundarySink for () {}
impl TerritorySink for () {}
impl PresentationSink for () {}
impl CueSink for () {}
