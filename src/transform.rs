//! Affine mapping between two axis-aligned rectangular extents.

use crate::coords::Coordinates;

/// An axis-aligned rectangle described by its starting corner and per-axis widths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub start_x: f64,
    pub start_y: f64,
    pub width_x: f64,
    pub width_y: f64,
}

impl Extent {
    /// Create a new extent.
    pub fn new(start_x: f64, start_y: f64, width_x: f64, width_y: f64) -> Self {
        Self {
            start_x,
            start_y,
            width_x,
            width_y,
        }
    }

    /// A square extent with side length `width`.
    pub fn square(start_x: f64, start_y: f64, width: f64) -> Self {
        Self::new(start_x, start_y, width, width)
    }

    /// The unit square `[0, 1) x [0, 1)`.
    pub fn unit() -> Self {
        Self::square(0., 0., 1.)
    }

    /// Returns `true` if the point lies in `[start, start + width)` on both axes.
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.start_x
            && y >= self.start_y
            && x < self.start_x + self.width_x
            && y < self.start_y + self.width_y
    }
}

/// Maps points from a source extent to a target extent by scaling and shifting each axis.
///
/// This is stateless apart from the two extents; `reverse(forward(p))` returns `p` up to floating
/// point rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordTransform {
    source: Extent,
    target: Extent,
}

impl CoordTransform {
    /// Create a transform from `source` to `target`.
    pub fn new(source: Extent, target: Extent) -> Self {
        Self { source, target }
    }

    /// Create a transform from `source` to the unit square.
    pub fn to_unit(source: Extent) -> Self {
        Self::new(source, Extent::unit())
    }

    /// The extent that [`forward`][Self::forward] maps from.
    pub fn source(&self) -> &Extent {
        &self.source
    }

    /// The extent that [`forward`][Self::forward] maps to.
    pub fn target(&self) -> &Extent {
        &self.target
    }

    /// Map a point from the source extent into the target extent.
    #[inline]
    pub fn forward(&self, coord: Coordinates) -> Coordinates {
        map(&self.source, &self.target, coord)
    }

    /// Map a point from the target extent back into the source extent.
    #[inline]
    pub fn reverse(&self, coord: Coordinates) -> Coordinates {
        map(&self.target, &self.source, coord)
    }
}

#[inline]
fn map(from: &Extent, to: &Extent, coord: Coordinates) -> Coordinates {
    let scale_x = (coord.x() - from.start_x) / from.width_x;
    let scale_y = (coord.y() - from.start_y) / from.width_y;
    Coordinates::new(
        to.start_x + scale_x * to.width_x,
        to.start_y + scale_y * to.width_y,
    )
}

#[cfg(test)]
mod test {
    use float_next_after::NextAfter;

    use super::*;

    /// Rounding error of a round trip grows with the magnitude of both extents, not with the
    /// magnitude of the point.
    fn round_trips(transform: &CoordTransform, coord: Coordinates) {
        let there = transform.forward(coord);
        let back = transform.reverse(there);

        let (source, target) = (transform.source(), transform.target());
        let scale = [
            source.start_x.abs() + source.width_x,
            source.start_y.abs() + source.width_y,
            (target.start_x.abs() + target.width_x) * source.width_x / target.width_x,
            (target.start_y.abs() + target.width_y) * source.width_y / target.width_y,
        ]
        .into_iter()
        .fold(0., f64::max);
        let tolerance = 8. * f64::EPSILON * scale;

        assert!(
            (back.x() - coord.x()).abs() <= tolerance && (back.y() - coord.y()).abs() <= tolerance,
            "{:?} -> {:?} -> {:?}",
            coord,
            there,
            back
        );
    }

    #[test]
    fn forward_to_unit_square() {
        let transform = CoordTransform::to_unit(Extent::square(2., 2., 4.));
        assert_eq!(
            transform.forward(Coordinates::new(2., 2.)),
            Coordinates::new(0., 0.)
        );
        assert_eq!(
            transform.forward(Coordinates::new(4., 5.)),
            Coordinates::new(0.5, 0.75)
        );
        assert_eq!(
            transform.forward(Coordinates::new(6., 6.)),
            Coordinates::new(1., 1.)
        );
    }

    #[test]
    fn reverse_from_unit_square() {
        let transform = CoordTransform::to_unit(Extent::square(-8., 16., 32.));
        assert_eq!(
            transform.reverse(Coordinates::new(0.25, 0.5)),
            Coordinates::new(0., 32.)
        );
    }

    #[test]
    fn rectangular_extents() {
        let transform = CoordTransform::new(
            Extent::new(0., 0., 10., 20.),
            Extent::new(100., -100., 1., 2.),
        );
        assert_eq!(
            transform.forward(Coordinates::new(5., 5.)),
            Coordinates::new(100.5, -99.5)
        );
        round_trips(&transform, Coordinates::new(7.25, 19.5));
        round_trips(&transform, Coordinates::new(0.1, 0.3));
    }

    #[test]
    fn round_trip_interior_and_boundary_points() {
        let extent = Extent::square(-3., 7., 1024.);
        let transform = CoordTransform::to_unit(extent);
        let upper_x = (extent.start_x + extent.width_x).next_after(f64::NEG_INFINITY);
        let upper_y = (extent.start_y + extent.width_y).next_after(f64::NEG_INFINITY);

        for coord in [
            Coordinates::new(-3., 7.),
            Coordinates::new(0., 0.),
            Coordinates::new(123.456, 789.012),
            Coordinates::new(upper_x, upper_y),
            Coordinates::new(-3., upper_y),
        ] {
            round_trips(&transform, coord);
        }
    }

    #[test]
    fn contains_is_half_open() {
        let extent = Extent::square(2., 2., 4.);
        assert!(extent.contains(2., 2.));
        assert!(extent.contains(5.99, 5.99));
        assert!(!extent.contains(6., 4.));
        assert!(!extent.contains(4., 6.));
        assert!(!extent.contains(1.999, 4.));
        assert!(!extent.contains(f64::NAN, 4.));
    }
}
