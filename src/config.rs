use serde::{Deserialize, Serialize};

use crate::{
    error::{PhysicsError, Result},
    units::DEFAULT_WORLD_UNITS_PER_METER,
    verlet_group::DEFAULT_CONSTRAINT_STRENGTH,
    wind::DEFAULT_WIND_INTERVAL,
};

/// Environment scalars of a [`crate::world::PhysicsWorld`].
///
/// Missing fields fall back to their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Downward acceleration in m/s².
    pub gravity: f32,
    /// Wind is resampled from `[-wind_magnitude, wind_magnitude]` m/s.
    pub wind_magnitude: f32,
    /// Seconds between wind changes.
    pub wind_interval: f32,
    pub world_units_per_meter: f32,
    /// Relaxation sweeps given to newly registered verlet groups.
    pub constraint_strength: usize,
    /// Fixed seed for reproducible wind. Entropy seeded when absent.
    pub seed: Option<u64>,
}

impl WorldConfig {
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("gravity", self.gravity),
            ("wind_magnitude", self.wind_magnitude),
            ("wind_interval", self.wind_interval),
            ("world_units_per_meter", self.world_units_per_meter),
        ];
        if let Some((name, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(PhysicsError::InvalidConfig(format!(
                "{name} must be finite, got {value}"
            )));
        }
        if self.world_units_per_meter <= 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "world_units_per_meter must be positive, got {}",
                self.world_units_per_meter
            )));
        }
        if self.wind_magnitude < 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "wind_magnitude must not be negative, got {}",
                self.wind_magnitude
            )));
        }
        if self.wind_interval <= 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "wind_interval must be positive, got {}",
                self.wind_interval
            )));
        }
        Ok(())
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            wind_magnitude: 5.0,
            wind_interval: DEFAULT_WIND_INTERVAL,
            world_units_per_meter: DEFAULT_WORLD_UNITS_PER_METER,
            constraint_strength: DEFAULT_CONSTRAINT_STRENGTH,
            seed: None,
        }
    }
}
