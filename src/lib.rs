#![doc = include_str!("../README.md")]

mod coords;
mod error;
pub mod quadtree;
pub mod transform;

pub use coords::{approx_eq, Coordinates};
pub use error::{QuadTreeError, Result};
pub use quadtree::{QuadTree, QuadTreeBuilder};

#[cfg(test)]
pub(crate) mod test;
