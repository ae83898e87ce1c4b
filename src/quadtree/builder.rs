use tracing::debug;

use crate::error::{QuadTreeError, Result};
use crate::quadtree::node::QuadNode;
use crate::quadtree::QuadTree;
use crate::transform::{CoordTransform, Extent};

/// The default number of tree levels used by [`QuadTreeBuilder::new`].
pub const DEFAULT_MAX_LEVELS: u32 = 10;

/// The default node capacity used by [`QuadTreeBuilder::new`]. Zero means nodes never subdivide.
pub const DEFAULT_CAPACITY: usize = 0;

/// A builder to create a [`QuadTree`].
///
/// ```
/// use quad_index::QuadTreeBuilder;
///
/// let tree = QuadTreeBuilder::new(1024)
///     .origin(-512., -512.)
///     .capacity(8)
///     .max_levels(12)
///     .finish::<&str>()
///     .unwrap();
/// assert!(tree.contains(-512., 511.9));
/// assert!(!tree.contains(512., 0.));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadTreeBuilder {
    width: u64,
    start_x: f64,
    start_y: f64,
    capacity: usize,
    max_levels: u32,
}

impl QuadTreeBuilder {
    /// Create a new builder for a square domain of the given width, starting at the origin, with
    /// the default capacity and number of levels.
    pub fn new(width: u64) -> Self {
        Self {
            width,
            start_x: 0.,
            start_y: 0.,
            capacity: DEFAULT_CAPACITY,
            max_levels: DEFAULT_MAX_LEVELS,
        }
    }

    /// Set the lower corner of the domain.
    pub fn origin(mut self, start_x: f64, start_y: f64) -> Self {
        self.start_x = start_x;
        self.start_y = start_y;
        self
    }

    /// Set the number of elements a node holds before it is subdivided.
    ///
    /// Nodes at level 0 accept any number of elements. A capacity of 0 disables subdivision, so
    /// every element is stored at the root.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the maximum number of tree levels. Must be in `1..=32`.
    pub fn max_levels(mut self, max_levels: u32) -> Self {
        self.max_levels = max_levels;
        self
    }

    /// Validate the configuration and create an empty tree.
    pub fn finish<T>(self) -> Result<QuadTree<T>> {
        if !(1..=32).contains(&self.max_levels) {
            return Err(QuadTreeError::InvalidMaxLevels(self.max_levels));
        }
        if !self.width.is_power_of_two() {
            return Err(QuadTreeError::InvalidWidth(self.width));
        }

        let extent = Extent::square(self.start_x, self.start_y, self.width as f64);
        debug!(
            width = self.width,
            start_x = self.start_x,
            start_y = self.start_y,
            capacity = self.capacity,
            max_levels = self.max_levels,
            "creating quad tree"
        );

        Ok(QuadTree {
            width: self.width,
            capacity: self.capacity,
            max_levels: self.max_levels,
            transform: CoordTransform::to_unit(extent),
            root: QuadNode::root(self.max_levels),
        })
    }
}
