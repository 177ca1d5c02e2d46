use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::trace;

use crate::error::{PhysicsError, Result};

pub const DEFAULT_WIND_INTERVAL: f32 = 0.5;

/// Wind scalar that is resampled on a fixed cadence.
///
/// The world only owns the value. Bodies that react to wind read it and call
/// `Body::apply_wind` themselves.
#[derive(Debug, Clone)]
pub struct Wind {
    magnitude: f32,
    interval: f32,
    active: f32,
    time_left: f32,
    rng: StdRng,
}

impl Wind {
    pub fn new(magnitude: f32, interval: f32, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            magnitude,
            interval,
            active: 0.0,
            time_left: interval,
            rng,
        }
    }

    /// Current wind in m/s; positive blows toward +x.
    pub fn active(&self) -> f32 {
        self.active
    }

    pub fn magnitude(&self) -> f32 {
        self.magnitude
    }

    /// Fails for negative or non-finite magnitudes and keeps the old value.
    pub fn set_magnitude(&mut self, magnitude: f32) -> Result<()> {
        if !magnitude.is_finite() || magnitude < 0.0 {
            return Err(PhysicsError::InvalidWindMagnitude(magnitude));
        }
        self.magnitude = magnitude;
        Ok(())
    }

    /// Advances the timer. Returns the new wind when a resample happened.
    pub fn update(&mut self, dt: f32) -> Option<f32> {
        self.time_left -= dt;
        if self.time_left >= 0.0 {
            return None;
        }

        // Scaling a unit sample keeps the range finite for any finite magnitude
        self.active = if self.magnitude > 0.0 {
            self.magnitude * self.rng.gen_range(-1.0f32..=1.0)
        } else {
            0.0
        };
        self.time_left = self.interval;
        trace!(wind = self.active, "wind resampled");
        Some(self.active)
    }
}
