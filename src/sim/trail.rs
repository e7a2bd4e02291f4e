//! Slime trail ledger
//!
//! Each snail owns one trail: a time-ordered list of samples that decay after
//! `point_lifetime` seconds. Whenever the list changes, the polyline is pushed
//! to the injected [`BoundarySink`]; the collision edge is only enabled once
//! there are at least two samples to span.

use glam::Vec2;

use super::shape::{TerritoryRegion, extract_shape};
use crate::error::{ConfigError, ShapeError};
use crate::sinks::BoundarySink;
use crate::tuning::TrailTuning;

/// A timestamped position laid down by a snail
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub pos: Vec2,
    /// Simulation time (seconds) the sample was laid
    pub created_at: f64,
}

/// Time-decaying ordered trail of samples
pub struct Trail {
    samples: Vec<Sample>,
    point_lifetime: f32,
    splat_probability: f32,
    boundary_enabled: bool,
    sink: Box<dyn BoundarySink>,
}

impl std::fmt::Debug for Trail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Trail")
            .field("samples", &self.samples.len())
            .field("point_lifetime", &self.point_lifetime)
            .field("boundary_enabled", &self.boundary_enabled)
            .finish()
    }
}

impl Trail {
    pub fn new(tuning: &TrailTuning, sink: Box<dyn BoundarySink>) -> Result<Self, ConfigError> {
        tuning.validate()?;
        Ok(Self {
            samples: Vec::new(),
            point_lifetime: tuning.point_lifetime,
            splat_probability: tuning.splat_probability,
            boundary_enabled: false,
            sink,
        })
    }

    /// Drop every sample and disable the collision edge
    pub fn clear(&mut self) {
        self.samples.clear();
        self.sync_boundary();
    }

    /// Expire samples whose age has reached the lifetime; returns how many went
    pub fn tick(&mut self, now: f64) -> usize {
        let before = self.samples.len();
        let lifetime = f64::from(self.point_lifetime);
        self.samples.retain(|s| now - s.created_at < lifetime);

        let removed = before - self.samples.len();
        if removed > 0 {
            log::trace!("trail expired {} samples, {} left", removed, self.samples.len());
            self.sync_boundary();
        }
        removed
    }

    /// Append a sample; spacing is the caller's responsibility
    pub fn add_point(&mut self, pos: Vec2, now: f64) {
        self.samples.push(Sample {
            pos,
            created_at: now,
        });
        self.sync_boundary();
    }

    /// Most recently laid position, or the origin if the trail is empty
    pub fn latest_position(&self) -> Vec2 {
        self.samples.last().map(|s| s.pos).unwrap_or(Vec2::ZERO)
    }

    /// Territory enclosed by the trail when the snail exits it at `reentry`
    pub fn extract_shape(&self, reentry: Vec2) -> Result<TerritoryRegion, ShapeError> {
        extract_shape(&self.samples, reentry)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn positions(&self) -> Vec<Vec2> {
        self.samples.iter().map(|s| s.pos).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn point_lifetime(&self) -> f32 {
        self.point_lifetime
    }

    pub fn splat_probability(&self) -> f32 {
        self.splat_probability
    }

    /// Whether the collision edge is live (two or more samples)
    pub fn boundary_enabled(&self) -> bool {
        self.boundary_enabled
    }

    fn sync_boundary(&mut self) {
        let positions = self.positions();
        self.sink.redraw(&positions);
        self.boundary_enabled = self.samples.len() >= 2;
        self.sink.set_collidable(self.boundary_enabled);
    }
}
