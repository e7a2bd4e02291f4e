//! Snail motion, boost and trail emission
//!
//! A snail always crawls forward; the player only steers and decides when to
//! spend boost charge. Charge refills linearly while idle and is spent in
//! whole gauge steps: a boost taken at a partial gauge lasts proportionally
//! shorter but follows the same easing curve.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::curve::BoostCurve;
use super::shape::TerritoryRegion;
use super::trail::Trail;
use crate::audio::SoundEffect;
use crate::consts::{BOOST_TURN_WEIGHT, POINT_THRESHOLD};
use crate::error::{ConfigError, ShapeError};
use crate::sinks::{Cue, CueSink};
use crate::tuning::SnailTuning;
use crate::{Player, heading, normalize_angle};

/// Per-tick controls for one snail
#[derive(Debug, Clone, Copy, Default)]
pub struct SnailInput {
    /// Steering axis in [-1, 1] (positive turns counter-clockwise)
    pub turn: f32,
    /// Boost button held
    pub boost: bool,
}

/// Position and orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub pos: Vec2,
    pub angle: f32,
}

/// Boost gauge reading reported to the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeLevel {
    /// Whole steps currently available
    Level(u32),
    /// Gauge was just emptied by an activation
    Drained,
}

impl ChargeLevel {
    /// Gauge value with `Drained` as -1
    pub fn as_i32(self) -> i32 {
        match self {
            ChargeLevel::Level(level) => i32::try_from(level).unwrap_or(i32::MAX),
            ChargeLevel::Drained => -1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoostState {
    Idle,
    Boosting { started_at: f64, duration: f32 },
}

/// Discrete collision reports from the physics layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollisionSignal {
    /// Hit the arena boundary
    WallCrash,
    /// Ran into the other snail's body
    OpponentCrash,
    /// Entered the other snail's trail or territory
    OpponentSlime,
    /// Slid back out of its own trail at this point
    OwnTrailExit(Vec2),
}

/// Why a snail died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CrashKind {
    Wall,
    Snail,
    Slime,
}

impl CrashKind {
    /// Whether the crash was caused by the opponent (and so scores for them)
    pub fn credits_opponent(self) -> bool {
        match self {
            CrashKind::Wall => false,
            CrashKind::Snail | CrashKind::Slime => true,
        }
    }
}

/// Something a snail reports to the game layer
#[derive(Debug, Clone, PartialEq)]
pub enum SnailEvent {
    ChargeChanged(ChargeLevel),
    BoostStarted { level: u32, duration: f32 },
    Crashed(CrashKind),
    ShapeReady(TerritoryRegion),
    ShapeRejected(ShapeError),
}

/// Everything a snail reported during one tick, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnailUpdate {
    pub events: Vec<SnailEvent>,
}

/// A player's avatar with its trail
pub struct Snail {
    player: Player,
    pos: Vec2,
    angle: f32,
    enabled: bool,
    crashed: bool,

    charge: f32,
    boost: BoostState,
    multiplier: f32,

    move_speed: f32,
    turn_speed: f32,
    max_boost_duration: f32,
    boost_steps: u32,
    recovery_time: f32,
    curve: BoostCurve,
    trail_origin_offset: f32,

    trail: Trail,
    cues: Box<dyn CueSink>,
    rng: Pcg32,
}

impl std::fmt::Debug for Snail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snail")
            .field("player", &self.player)
            .field("pos", &self.pos)
            .field("angle", &self.angle)
            .field("enabled", &self.enabled)
            .field("crashed", &self.crashed)
            .field("charge", &self.charge)
            .field("boost", &self.boost)
            .field("trail", &self.trail)
            .finish()
    }
}

impl Snail {
    pub fn new(
        player: Player,
        tuning: &SnailTuning,
        trail: Trail,
        cues: Box<dyn CueSink>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        tuning.validate()?;
        Ok(Self {
            player,
            pos: Vec2::ZERO,
            angle: 0.0,
            enabled: false,
            crashed: false,
            charge: 1.0,
            boost: BoostState::Idle,
            multiplier: 0.0,
            move_speed: tuning.move_speed,
            turn_speed: tuning.turn_speed,
            max_boost_duration: tuning.max_boost_duration,
            boost_steps: tuning.boost_steps,
            recovery_time: tuning.boost_recovery_time,
            curve: tuning.boost_curve.clone(),
            trail_origin_offset: tuning.trail_origin_offset,
            trail,
            cues,
            rng: Pcg32::seed_from_u64(seed),
        })
    }

    /// Place at a start pose with a full gauge
    pub fn reset(&mut self, pose: Pose) {
        self.pos = pose.pos;
        self.angle = normalize_angle(pose.angle);
        self.crashed = false;
        self.charge = 1.0;
        self.boost = BoostState::Idle;
        self.multiplier = 0.0;
    }

    /// Allow or freeze movement; toggles the slime loop sound
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        let sound = if enabled {
            SoundEffect::SlimeLoopStart
        } else {
            SoundEffect::SlimeLoopStop
        };
        self.cues.cue(Cue::Sound(sound));
    }

    /// Advance one tick: move, lay slime, then run the boost gauge
    pub fn update(&mut self, input: &SnailInput, now: f64, dt: f32) -> SnailUpdate {
        let mut update = SnailUpdate::default();
        if !self.enabled || self.crashed {
            return update;
        }

        self.integrate(input.turn, dt);
        self.emit_trail(now);
        self.update_boost(input.boost, now, dt, &mut update.events);
        update
    }

    /// React to a physics report; inert while frozen or dead
    pub fn handle_collision(&mut self, signal: CollisionSignal) -> Option<SnailEvent> {
        if !self.enabled || self.crashed {
            return None;
        }

        let kind = match signal {
            CollisionSignal::WallCrash => CrashKind::Wall,
            CollisionSignal::OpponentCrash => CrashKind::Snail,
            CollisionSignal::OpponentSlime => CrashKind::Slime,
            CollisionSignal::OwnTrailExit(point) => return Some(self.claim(point)),
        };

        self.crashed = true;
        self.cues.cue(Cue::Dead);
        self.cues.cue(Cue::Sound(SoundEffect::Death));
        log::debug!("{} crashed: {:?} at {:?}", self.player, kind, self.pos);
        Some(SnailEvent::Crashed(kind))
    }

    fn claim(&mut self, point: Vec2) -> SnailEvent {
        match self.trail.extract_shape(point) {
            Ok(region) => {
                self.cues.cue(Cue::Sound(SoundEffect::BlobCreate));
                log::debug!(
                    "{} claimed territory: {} points, area {:.2}",
                    self.player,
                    region.len(),
                    region.area()
                );
                SnailEvent::ShapeReady(region)
            }
            Err(err) => {
                log::debug!("{} failed to create slime blob: {}", self.player, err);
                SnailEvent::ShapeRejected(err)
            }
        }
    }

    fn integrate(&mut self, turn: f32, dt: f32) {
        let boost = self.current_multiplier();
        let turn = if turn.is_finite() {
            turn.clamp(-1.0, 1.0)
        } else {
            0.0
        };

        self.pos += heading(self.angle) * self.move_speed * (1.0 + boost) * dt;
        self.cues.cue(Cue::Turn(turn));
        self.angle = normalize_angle(
            self.angle + turn * self.turn_speed * (1.0 + boost * BOOST_TURN_WEIGHT) * dt,
        );
    }

    fn emit_trail(&mut self, now: f64) {
        let origin = self.trail_origin();
        if origin.distance(self.trail.latest_position()) <= POINT_THRESHOLD {
            return;
        }
        if self.rng.random::<f32>() < self.trail.splat_probability() {
            self.cues.cue(Cue::Splat {
                pos: origin,
                lifetime: self.trail.point_lifetime(),
            });
        }
        self.trail.add_point(origin, now);
    }

    fn update_boost(&mut self, held: bool, now: f64, dt: f32, events: &mut Vec<SnailEvent>) {
        match self.boost {
            BoostState::Idle => {
                let level = self.charge_level();
                events.push(SnailEvent::ChargeChanged(ChargeLevel::Level(level)));
                self.charge = (self.charge + dt / self.recovery_time).min(1.0);

                if held && level > 0 {
                    self.cues.cue(Cue::Sound(SoundEffect::BoostStart));
                    events.push(SnailEvent::ChargeChanged(ChargeLevel::Drained));

                    let duration =
                        self.max_boost_duration * (level as f32 / self.boost_steps as f32);
                    self.boost = BoostState::Boosting {
                        started_at: now,
                        duration,
                    };
                    self.charge = 0.0;
                    log::debug!("{} boost: level {} for {:.2}s", self.player, level, duration);
                    events.push(SnailEvent::BoostStarted { level, duration });
                }
            }
            BoostState::Boosting {
                started_at,
                duration,
            } => {
                let elapsed = (now - started_at) as f32;
                self.multiplier = self.curve.evaluate(elapsed / duration);
                if elapsed > self.max_boost_duration {
                    self.boost = BoostState::Idle;
                    self.multiplier = 0.0;
                }
            }
        }
    }

    fn current_multiplier(&self) -> f32 {
        match self.boost {
            BoostState::Boosting { .. } => self.multiplier,
            BoostState::Idle => 0.0,
        }
    }

    /// Whole gauge steps available right now
    pub fn charge_level(&self) -> u32 {
        // charge is clamped to [0, 1], so this fits in boost_steps
        (self.charge * self.boost_steps as f32).floor() as u32
    }

    /// Where slime is laid: a little behind the snail's center
    pub fn trail_origin(&self) -> Vec2 {
        self.pos - heading(self.angle) * self.trail_origin_offset
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn pose(&self) -> Pose {
        Pose {
            pos: self.pos,
            angle: self.angle,
        }
    }

    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_crashed(&self) -> bool {
        self.crashed
    }

    pub fn charge(&self) -> f32 {
        self.charge
    }

    pub fn boost_state(&self) -> BoostState {
        self.boost
    }

    pub fn is_boosting(&self) -> bool {
        matches!(self.boost, BoostState::Boosting { .. })
    }

    pub fn boost_multiplier(&self) -> f32 {
        self.current_multiplier()
    }

    pub fn boost_steps(&self) -> u32 {
        self.boost_steps
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    pub fn trail_mut(&mut self) -> &mut Trail {
        &mut self.trail
    }
}
