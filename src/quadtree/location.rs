//! Location codes: the quadrant path of a normalized point, packed into two bit vectors.

use std::fmt;

use crate::coords::Coordinates;

/// One of the four equal sub-regions of a node.
///
/// Quadrants are numbered `(x, y)`: `(0, 0) = 0`, `(0, 1) = 1`, `(1, 0) = 2`, `(1, 1) = 3`. This
/// numbering (not Z-order) defines the iteration order of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quadrant(u8);

impl Quadrant {
    /// All quadrants in canonical order.
    pub const ALL: [Quadrant; 4] = [Quadrant(0), Quadrant(1), Quadrant(2), Quadrant(3)];

    /// The quadrant on the given side of each axis. `true` means the upper half.
    #[inline]
    pub fn new(x: bool, y: bool) -> Self {
        Self((u8::from(x) << 1) | u8::from(y))
    }

    /// The quadrant with the given canonical index. Only the lowest two bits are used.
    #[inline]
    pub fn from_index(index: u8) -> Self {
        Self(index & 0b11)
    }

    /// The canonical index, in `0..4`.
    #[inline]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// Returns `true` for the upper half of the x axis.
    #[inline]
    pub fn x(self) -> bool {
        self.0 & 0b10 != 0
    }

    /// Returns `true` for the upper half of the y axis.
    #[inline]
    pub fn y(self) -> bool {
        self.0 & 0b01 != 0
    }
}

/// The address of a point at the finest resolution of a tree with `max_levels` levels.
///
/// Each axis is stored as a `max_levels` wide bit vector holding
/// `floor(coord * 2^max_levels) mod 2^max_levels` with the lowest bit cleared. The bit at index
/// `k` (counted from the least significant end) is the quadrant decision made by a node at level
/// `k`. Level 0 nodes never subdivide, so bit 0 is always zero.
///
/// Two points that fall into the same lattice cell get identical codes, which is how
/// [`erase`][crate::QuadTree::erase] matches stored elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocationCode {
    x: u32,
    y: u32,
    max_levels: u8,
}

impl LocationCode {
    /// Derive the code of a point in normalized (unit square) coordinates.
    ///
    /// Values slightly outside of `[0, 1)`, as produced by rounding at the upper domain boundary,
    /// are wrapped into range rather than rejected. Negative and NaN inputs map to zero.
    ///
    /// # Panics
    ///
    /// Panics if `max_levels` is not in `1..=32`.
    pub fn new(coord: Coordinates, max_levels: u32) -> Self {
        assert!((1..=32).contains(&max_levels));
        Self {
            x: scale_axis(coord.x(), max_levels),
            y: scale_axis(coord.y(), max_levels),
            max_levels: max_levels as u8,
        }
    }

    /// The code of the root node of a tree with `max_levels` levels: no quadrant decided yet.
    pub(crate) fn root(max_levels: u32) -> Self {
        assert!((1..=32).contains(&max_levels));
        Self {
            x: 0,
            y: 0,
            max_levels: max_levels as u8,
        }
    }

    /// The raw x bit vector.
    #[inline]
    pub fn x(&self) -> u32 {
        self.x
    }

    /// The raw y bit vector.
    #[inline]
    pub fn y(&self) -> u32 {
        self.y
    }

    /// The width of each bit vector.
    #[inline]
    pub fn max_levels(&self) -> u32 {
        u32::from(self.max_levels)
    }

    /// The quadrant chosen by a node at `level` for this code.
    #[inline]
    pub fn quadrant(&self, level: u32) -> Quadrant {
        Quadrant::new(bit(self.x, level), bit(self.y, level))
    }

    /// The code of the child that a node at `level` with this code has in `quadrant`.
    #[inline]
    pub(crate) fn with_quadrant(self, level: u32, quadrant: Quadrant) -> Self {
        Self {
            x: self.x | (u32::from(quadrant.x()) << level),
            y: self.y | (u32::from(quadrant.y()) << level),
            max_levels: self.max_levels,
        }
    }

    /// Returns `true` if both codes agree on every bit strictly above `level`.
    #[inline]
    pub(crate) fn shares_prefix(&self, other: &Self, level: u32) -> bool {
        let mask = u32::MAX.checked_shl(level + 1).unwrap_or(0);
        (self.x ^ other.x) & mask == 0 && (self.y ^ other.y) & mask == 0
    }

    /// The x bit vector as a string, most significant bit first.
    pub fn x_bits(&self) -> String {
        format_bits(self.x, self.max_levels())
    }

    /// The y bit vector as a string, most significant bit first.
    pub fn y_bits(&self) -> String {
        format_bits(self.y, self.max_levels())
    }
}

impl fmt::Display for LocationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x_bits(), self.y_bits())
    }
}

#[inline]
fn bit(value: u32, index: u32) -> bool {
    index < 32 && (value >> index) & 1 == 1
}

#[inline]
fn scale_axis(value: f64, max_levels: u32) -> u32 {
    let lattice = (1u64 << max_levels) as f64;
    // Float to int casts saturate, so negative and NaN input lands on zero.
    let scaled = (value * lattice).floor() as u64;
    let mask = (1u64 << max_levels) - 1;
    ((scaled & mask) & !1) as u32
}

fn format_bits(value: u32, width: u32) -> String {
    (0..width)
        .rev()
        .map(|i| if bit(value, i) { '1' } else { '0' })
        .collect()
}
