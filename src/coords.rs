//! Two-dimensional points with approximate equality.

use std::cmp::Ordering;

use geo_traits::CoordTrait;
use num_traits::Float;

/// Compare two floats using a relative epsilon.
///
/// The tolerance scales with the larger magnitude of the two operands, so `1e9` and `1e9 + 1e-7`
/// compare equal while `0.0` only equals `0.0` (or `-0.0`).
#[inline]
pub fn approx_eq<F: Float>(a: F, b: F) -> bool {
    let diff = (a - b).abs();
    let a = a.abs();
    let b = b.abs();
    let largest = if b > a { b } else { a };
    let four = F::one() + F::one() + F::one() + F::one();
    diff <= largest * four * F::epsilon()
}

/// An immutable 2D point.
///
/// Equality is approximate (see [`approx_eq`]), so `PartialEq` is not transitive and there is
/// deliberately no `Eq` or `Hash` implementation.
///
/// The ordering operators are strict per-axis conjunctions: `a < b` only when **both** `a.x <
/// b.x` and `a.y < b.y`. Points that are smaller on one axis and larger on the other are
/// unordered. This ordering is not used by the tree itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coordinates {
    x: f64,
    y: f64,
}

impl Coordinates {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The x coordinate.
    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    /// The y coordinate.
    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }
}

impl PartialEq for Coordinates {
    fn eq(&self, other: &Self) -> bool {
        approx_eq(self.x, other.x) && approx_eq(self.y, other.y)
    }
}

impl PartialOrd for Coordinates {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        // Strict comparisons win over approximate equality.
        if self.x < other.x && self.y < other.y {
            Some(Ordering::Less)
        } else if self.x > other.x && self.y > other.y {
            Some(Ordering::Greater)
        } else if self == other {
            Some(Ordering::Equal)
        } else {
            None
        }
    }
}

impl From<(f64, f64)> for Coordinates {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<Coordinates> for (f64, f64) {
    fn from(value: Coordinates) -> Self {
        (value.x, value.y)
    }
}

impl CoordTrait for Coordinates {
    type T = f64;

    fn dim(&self) -> geo_traits::Dimensions {
        geo_traits::Dimensions::Xy
    }

    fn x(&self) -> Self::T {
        self.x
    }

    fn y(&self) -> Self::T {
        self.y
    }

    fn nth_or_panic(&self, n: usize) -> Self::T {
        match n {
            0 => self.x,
            1 => self.y,
            _ => panic!("Invalid index of coord"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn equal_points_compare_equal() {
        assert_eq!(Coordinates::new(1.0, 2.0), Coordinates::new(1.0, 2.0));
        assert_eq!(Coordinates::new(0.0, 0.0), Coordinates::new(-0.0, 0.0));
    }

    #[test]
    fn equality_tolerates_rounding_error() {
        let a = Coordinates::new(0.1 + 0.2, 1e9);
        let b = Coordinates::new(0.3, 1e9 + 1e-7);
        assert_eq!(a, b);
        assert!(!(a != b));
    }

    #[test]
    fn distinct_points_are_not_equal() {
        assert_ne!(Coordinates::new(1.00001, 1.0), Coordinates::new(1.00002, 1.0));
        assert_ne!(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 1e-300));
    }

    #[test]
    fn ordering_is_a_per_axis_conjunction() {
        let origin = Coordinates::new(0.0, 0.0);
        let both = Coordinates::new(1.0, 1.0);
        let mixed = Coordinates::new(1.0, -1.0);

        assert!(origin < both);
        assert!(both > origin);
        assert!(!(origin < mixed));
        assert!(!(origin > mixed));
        assert_eq!(origin.partial_cmp(&mixed), None);
        assert_eq!(origin.partial_cmp(&origin), Some(Ordering::Equal));
    }

    #[test]
    fn ordering_needs_strictly_smaller_axes() {
        let a = Coordinates::new(1.0, 1.0);
        let b = Coordinates::new(1.0, 2.0);
        assert!(!(a < b));
        assert!(!(b > a));
    }

    #[test]
    fn ordering_is_strict_within_rounding_distance() {
        let a = Coordinates::new(1.0, 1.0);
        let b = Coordinates::new(1.0 + f64::EPSILON, 1.0 + f64::EPSILON);
        assert_eq!(a, b);
        assert!(a < b);
        assert!(b > a);
        assert!(!(b < a));
        assert_eq!(a.partial_cmp(&b), Some(Ordering::Less));
    }

    #[test]
    fn coord_trait_access() {
        let point = Coordinates::from((3.0, 4.0));
        assert_eq!(point.nth_or_panic(0), 3.0);
        assert_eq!(point.nth_or_panic(1), 4.0);
        assert_eq!(CoordTrait::x(&point), 3.0);
        assert_eq!(CoordTrait::y(&point), 4.0);
        assert_eq!(<(f64, f64)>::from(point), (3.0, 4.0));
    }

    #[test]
    fn approx_eq_for_f32() {
        assert!(approx_eq(0.1f32 + 0.2, 0.3));
        assert!(!approx_eq(1.0f32, 1.001));
    }
}
