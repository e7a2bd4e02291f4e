//! Territory shape extraction
//!
//! When a snail slides back out of its own trail, the loop it just closed is
//! the trail from the sample nearest the exit point up to the head. The
//! newest few samples are skipped in the search so the exit point cannot
//! match the slime it is currently sitting on.

use glam::Vec2;

use super::trail::Sample;
use crate::consts::{MIN_POLYGON_POINTS, MIN_SHAPE_POINT_COUNT};
use crate::error::ShapeError;

/// A claimed region: closed polygon whose last vertex is the centroid
#[derive(Debug, Clone, PartialEq)]
pub struct TerritoryRegion {
    pub points: Vec<Vec2>,
    pub centroid: Vec2,
}

impl TerritoryRegion {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Unsigned polygon area (shoelace)
    pub fn area(&self) -> f32 {
        let n = self.points.len();
        if n < MIN_POLYGON_POINTS {
            return 0.0;
        }
        let twice: f32 = (0..n)
            .map(|i| self.points[i].perp_dot(self.points[(i + 1) % n]))
            .sum();
        twice.abs() * 0.5
    }
}

/// Index of the searchable sample nearest `target` (earliest wins ties)
fn nearest_sample(samples: &[Sample], target: Vec2) -> Option<usize> {
    let searchable = samples.len().saturating_sub(MIN_SHAPE_POINT_COUNT - 1);

    let mut best: Option<(usize, f32)> = None;
    for (i, sample) in samples[..searchable].iter().enumerate() {
        let dist = sample.pos.distance(target);
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((i, dist)),
        }
    }
    best.map(|(i, _)| i)
}

/// Build the region enclosed by the trail suffix starting nearest `reentry`
pub fn extract_shape(samples: &[Sample], reentry: Vec2) -> Result<TerritoryRegion, ShapeError> {
    if !reentry.is_finite() {
        return Err(ShapeError::NonFiniteReentry);
    }

    let insufficient = ShapeError::InsufficientPoints {
        count: samples.len(),
    };
    let k = nearest_sample(samples, reentry).ok_or_else(|| insufficient.clone())?;

    let suffix = &samples[k..];
    if suffix.len() + 1 < MIN_POLYGON_POINTS {
        return Err(insufficient);
    }

    let mut points: Vec<Vec2> = suffix.iter().map(|s| s.pos).collect();
    let centroid = points.iter().copied().sum::<Vec2>() / points.len() as f32;
    points.push(centroid);

    Ok(TerritoryRegion { points, centroid })
}
