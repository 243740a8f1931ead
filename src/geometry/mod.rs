//! Planar geometry: points, affine transformations and sampleable curves.

mod curve;
mod point;
mod transform;

pub use curve::{Curve, EllipticalArc};
pub use point::Point;
pub use transform::Transformation;

/// Number of decimal places implied by a tolerance, e.g. `0.01` gives 2.
pub fn precision_for(tolerance: f64) -> usize {
    tolerance.log10().round().abs() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precision_for() {
        assert_eq!(precision_for(0.01), 2);
        assert_eq!(precision_for(0.001), 3);
        assert_eq!(precision_for(0.05), 1);
        assert_eq!(precision_for(1.0), 0);
    }
}
