//! Point types and coordinate quantization

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Number of decimal places used when comparing positions for equality
pub const POSITION_DECIMALS: u32 = 6;

/// A position snapped to a fixed decimal grid.
///
/// Two points compare equal as `QuantizedPoint`s exactly when every
/// coordinate agrees after rounding to [`POSITION_DECIMALS`] places. This is
/// the identity used both for vertex deduplication at load time and for
/// edge deduplication when deriving the wireframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuantizedPoint([i64; 3]);

impl QuantizedPoint {
    /// Quantize a point using the default precision
    pub fn new(point: &Point3f) -> Self {
        Self::with_decimals(point, POSITION_DECIMALS)
    }

    /// Quantize a point to the given number of decimal places
    pub fn with_decimals(point: &Point3f, decimals: u32) -> Self {
        let scale = 10f64.powi(decimals as i32);
        // Rounding happens in f64 so that f32 inputs near a grid boundary
        // snap the same way regardless of the order they are seen in.
        let snap = |v: f32| (f64::from(v) * scale).round() as i64;
        Self([snap(point.x), snap(point.y), snap(point.z)])
    }

    /// Raw grid coordinates
    pub fn coords(&self) -> [i64; 3] {
        self.0
    }
}

impl From<&Point3f> for QuantizedPoint {
    fn from(point: &Point3f) -> Self {
        Self::new(point)
    }
}

/// Returns true when every coordinate of the point is finite
pub fn is_finite_point(point: &Point3f) -> bool {
    point.x.is_finite() && point.y.is_finite() && point.z.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantized_equal_within_precision() {
        let a = Point3f::new(1.0, -2.0, 0.5);
        let b = Point3f::new(1.000_000_2, -2.000_000_1, 0.500_000_3);
        assert_eq!(QuantizedPoint::new(&a), QuantizedPoint::new(&b));
    }

    #[test]
    fn test_quantized_distinct_beyond_precision() {
        let a = Point3f::new(1.0, 0.0, 0.0);
        let b = Point3f::new(1.00001, 0.0, 0.0);
        assert_ne!(QuantizedPoint::new(&a), QuantizedPoint::new(&b));
    }

    #[test]
    fn test_negative_zero_matches_zero() {
        let a = Point3f::new(0.0, 0.0, 0.0);
        let b = Point3f::new(-0.0, -0.000_000_1, 0.0);
        assert_eq!(QuantizedPoint::new(&a), QuantizedPoint::new(&b));
    }

    #[test]
    fn test_custom_precision() {
        let a = Point3f::new(1.04, 0.0, 0.0);
        let b = Point3f::new(1.0, 0.0, 0.0);
        assert_eq!(QuantizedPoint::with_decimals(&a, 1), QuantizedPoint::with_decimals(&b, 1));
        assert_eq!(QuantizedPoint::with_decimals(&a, 1).coords(), [10, 0, 0]);
    }
}
