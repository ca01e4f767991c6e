//! Rink geometry and the raw -> normalized coordinate mapping
//!
//! The tracking feed reports positions in its own units (inches from the
//! boards corner on a 2400 x 1020 extent). Everything downstream of the
//! mapper works in normalized rink units (feet on a 200 x 85 surface).

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A position on the normalized rink surface
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RinkPoint {
    pub x: f64,
    pub y: f64,
}

impl RinkPoint {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Extents of the feed coordinate system and of the normalized rink
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RinkGeometry {
    /// Feed units spanning the full rink length
    pub raw_width: f64,
    /// Feed units spanning the full rink width
    pub raw_height: f64,
    /// Normalized rink length
    pub width: f64,
    /// Normalized rink width
    pub height: f64,
}

impl RinkGeometry {
    pub const DEFAULT_RAW_WIDTH: f64 = 2400.0;
    pub const DEFAULT_RAW_HEIGHT: f64 = 1020.0;
    pub const DEFAULT_WIDTH: f64 = 200.0;
    pub const DEFAULT_HEIGHT: f64 = 85.0;

    /// Check that every extent is finite and positive
    pub fn validate(&self) -> Result<()> {
        let extents = [
            ("raw_width", self.raw_width),
            ("raw_height", self.raw_height),
            ("width", self.width),
            ("height", self.height),
        ];
        for (name, value) in extents {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "rink {} must be positive, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }

    /// Center of the normalized rink
    pub fn center(&self) -> RinkPoint {
        RinkPoint::new(self.width / 2.0, self.height / 2.0)
    }
}

impl Default for RinkGeometry {
    fn default() -> Self {
        Self {
            raw_width: Self::DEFAULT_RAW_WIDTH,
            raw_height: Self::DEFAULT_RAW_HEIGHT,
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
        }
    }
}

/// Stateless affine mapping from feed units to the normalized rink
///
/// Output is always clamped to `[0, width] x [0, height]`; out-of-range
/// tracking noise is expected and never raised as an error.
///
/// # Example
///
/// ```
/// use puckplay_core::{CoordinateMapper, RinkGeometry};
///
/// let mapper = CoordinateMapper::new(RinkGeometry::default());
/// let p = mapper.map(1200.0, 510.0);
/// assert_eq!((p.x, p.y), (100.0, 42.5));
///
/// // Noise past the boards is clamped
/// let p = mapper.map(-50.0, 5000.0);
/// assert_eq!((p.x, p.y), (0.0, 85.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    geometry: RinkGeometry,
}

impl CoordinateMapper {
    /// Create a mapper for the given geometry
    pub fn new(geometry: RinkGeometry) -> Self {
        Self { geometry }
    }

    /// The geometry this mapper was built from
    pub fn geometry(&self) -> &RinkGeometry {
        &self.geometry
    }

    /// Map a raw feed position onto the normalized rink
    #[inline]
    pub fn map(&self, raw_x: f64, raw_y: f64) -> RinkPoint {
        let g = &self.geometry;
        RinkPoint {
            x: clamp_axis(raw_x / g.raw_width * g.width, g.width),
            y: clamp_axis(raw_y / g.raw_height * g.height, g.height),
        }
    }
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::new(RinkGeometry::default())
    }
}

// NaN collapses to the lower bound so geometry tests never see it.
#[inline]
fn clamp_axis(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_corners() {
        let mapper = CoordinateMapper::default();
        assert_eq!(mapper.map(0.0, 0.0), RinkPoint::new(0.0, 0.0));
        assert_eq!(mapper.map(2400.0, 1020.0), RinkPoint::new(200.0, 85.0));
        assert_eq!(mapper.map(600.0, 255.0), RinkPoint::new(50.0, 21.25));
    }

    #[test]
    fn test_map_clamps_out_of_range() {
        let mapper = CoordinateMapper::default();
        assert_eq!(mapper.map(3000.0, -10.0), RinkPoint::new(200.0, 0.0));
        assert_eq!(mapper.map(f64::NAN, f64::INFINITY), RinkPoint::new(0.0, 85.0));
    }

    #[test]
    fn test_custom_geometry() {
        let mapper = CoordinateMapper::new(RinkGeometry {
            raw_width: 100.0,
            raw_height: 50.0,
            width: 1.0,
            height: 1.0,
        });
        assert_eq!(mapper.map(50.0, 25.0), RinkPoint::new(0.5, 0.5));
    }

    #[test]
    fn test_validate() {
        assert!(RinkGeometry::default().validate().is_ok());
        let bad = RinkGeometry {
            raw_width: 0.0,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(Error::InvalidConfig(_))));
    }
}
