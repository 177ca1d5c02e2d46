use glam::Vec2;

use crate::error::{PhysicsError, Result};

/// Level width the default scale is derived from: 18 world units span 1km.
pub const DEFAULT_WORLD_UNITS_PER_METER: f32 = 18.0 / 1000.0;

/// Converts between world units (what the scene positions are expressed in)
/// and meters (what velocities and forces are expressed in).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    world_units_per_meter: f32,
}

impl UnitConverter {
    /// Fails unless `world_units_per_meter` is finite and positive.
    pub fn new(world_units_per_meter: f32) -> Result<Self> {
        if !world_units_per_meter.is_finite() || world_units_per_meter <= 0.0 {
            return Err(PhysicsError::InvalidScale(world_units_per_meter));
        }
        Ok(Self {
            world_units_per_meter,
        })
    }

    pub fn world_units_per_meter(&self) -> f32 {
        self.world_units_per_meter
    }

    pub fn to_world_units(&self, meters: Vec2) -> Vec2 {
        meters * self.world_units_per_meter
    }

    pub fn to_physical_units(&self, units: Vec2) -> Vec2 {
        units / self.world_units_per_meter
    }
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self {
            world_units_per_meter: DEFAULT_WORLD_UNITS_PER_METER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scale_maps_a_kilometer_to_eighteen_units() {
        let units = UnitConverter::default();
        let w = units.to_world_units(Vec2::new(1000.0, -500.0));
        assert!((w.x - 18.0).abs() < 1e-4);
        assert!((w.y + 9.0).abs() < 1e-4);
    }

    #[test]
    fn half_scale_doubles_physical_lengths() {
        let units = UnitConverter::new(0.5).unwrap();
        assert_eq!(units.to_world_units(Vec2::splat(4.0)), Vec2::splat(2.0));
        assert_eq!(units.to_physical_units(Vec2::splat(2.0)), Vec2::splat(4.0));
    }

    #[test]
    fn degenerate_scales_are_rejected() {
        for scale in [0.0, -0.018, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                UnitConverter::new(scale),
                Err(PhysicsError::InvalidScale(_))
            ));
        }
    }
}
