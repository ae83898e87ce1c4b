//! A mutable quadtree that subdivides space only where point density requires it.

#![warn(missing_docs)]

mod builder;
mod cursor;
mod index;
mod location;
mod node;
mod traversal;

pub use builder::{QuadTreeBuilder, DEFAULT_CAPACITY, DEFAULT_MAX_LEVELS};
pub use cursor::{Cursor, Iter, Position};
pub use index::{Near, QuadTree};
pub use location::{LocationCode, Quadrant};
pub use traversal::NodePath;
