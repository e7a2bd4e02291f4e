//! Boost easing curve
//!
//! Piecewise-linear keyframes evaluated at normalized boost time. Inputs
//! outside the key range clamp to the first/last value, so a partial boost
//! whose clock runs past 1.0 simply holds the tail value.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A single (time, value) key
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub t: f32,
    pub value: f32,
}

/// Monotonic speed-multiplier curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostCurve {
    keys: Vec<Key>,
}

impl Default for BoostCurve {
    /// Strong kick that eases out to nothing
    fn default() -> Self {
        Self {
            keys: vec![
                Key { t: 0.0, value: 2.0 },
                Key { t: 0.3, value: 1.4 },
                Key { t: 1.0, value: 0.0 },
            ],
        }
    }
}

impl BoostCurve {
    /// Build a curve, validating its keys
    pub fn new(keys: Vec<Key>) -> Result<Self, ConfigError> {
        let curve = Self { keys };
        curve.validate()?;
        Ok(curve)
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// Keys must be finite, strictly increasing in time, and monotonic in value
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keys.is_empty() {
            return Err(ConfigError::invalid(
                "snail.boost_curve",
                "needs at least one key",
            ));
        }
        if self
            .keys
            .iter()
            .any(|k| !k.t.is_finite() || !k.value.is_finite())
        {
            return Err(ConfigError::invalid("snail.boost_curve", "keys must be finite"));
        }
        if self.keys.windows(2).any(|w| w[1].t <= w[0].t) {
            return Err(ConfigError::invalid(
                "snail.boost_curve",
                "key times must be strictly increasing",
            ));
        }
        let rising = self.keys.windows(2).all(|w| w[1].value >= w[0].value);
        let falling = self.keys.windows(2).all(|w| w[1].value <= w[0].value);
        if !rising && !falling {
            return Err(ConfigError::invalid(
                "snail.boost_curve",
                "values must be monotonic",
            ));
        }
        Ok(())
    }

    /// Sample the curve at `t`
    pub fn evaluate(&self, t: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if t.is_nan() || t <= first.t {
            return first.value;
        }
        if t >= last.t {
            return last.value;
        }

        // First key strictly after t; t > first.t guarantees idx >= 1
        let idx = self.keys.partition_point(|k| k.t <= t);
        let a = self.keys[idx - 1];
        let b = self.keys[idx];
        let s = (t - a.t) / (b.t - a.t);
        a.value + (b.value - a.value) * s
    }
}
