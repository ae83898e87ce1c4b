use std::fmt;
use std::iter::FusedIterator;

use geo_traits::CoordTrait;
use tracing::{debug, trace};

use crate::coords::Coordinates;
use crate::error::Result;
use crate::quadtree::builder::QuadTreeBuilder;
use crate::quadtree::cursor::{entry_at, entry_at_mut, first_position, Cursor, Iter, Position};
use crate::quadtree::location::LocationCode;
use crate::quadtree::node::{Entry, QuadNode};
use crate::quadtree::traversal::NodePath;
use crate::transform::{CoordTransform, Extent};

/// A mutable quadtree over the square domain `[start_x, start_x + width) x [start_y, start_y +
/// width)`.
///
/// Elements are stored in the bucket of the node their point currently resolves to. When a
/// bucket at level `> 0` already holds `capacity` elements, the next insertion routed to it moves
/// the bucket one level down into lazily created children. Level 0 buckets are unbounded. The tree
/// only ever grows: removing elements never merges or drops nodes.
///
/// Usually this will be created via [`QuadTreeBuilder`].
///
/// # Concurrency
///
/// The tree is a plain owned data structure. It is `Send` and `Sync` when `T` is, and all
/// mutation goes through `&mut self`, so sharing a tree between threads for writing requires
/// external synchronization such as a `Mutex` or `RwLock`.
#[derive(Debug, Clone)]
pub struct QuadTree<T> {
    pub(crate) width: u64,
    pub(crate) capacity: usize,
    pub(crate) max_levels: u32,
    pub(crate) transform: CoordTransform,
    pub(crate) root: QuadNode<T>,
}

impl<T> QuadTree<T> {
    /// Create a tree over `[0, width) x [0, width)` with the default capacity and levels.
    ///
    /// `width` must be a non-zero power of two.
    pub fn try_new(width: u64) -> Result<Self> {
        QuadTreeBuilder::new(width).finish()
    }

    /// The width (and height) of the domain.
    pub fn width(&self) -> u64 {
        self.width
    }

    /// The lower corner of the domain.
    pub fn origin(&self) -> (f64, f64) {
        let extent = self.extent();
        (extent.start_x, extent.start_y)
    }

    /// The domain covered by this tree.
    pub fn extent(&self) -> &Extent {
        self.transform.source()
    }

    /// The number of elements a node at level `> 0` holds before it is subdivided.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The maximum number of tree levels.
    pub fn max_levels(&self) -> u32 {
        self.max_levels
    }

    /// Returns `true` if the point lies within the half-open domain of this tree.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.extent().contains(x, y)
    }

    /// The location code of a point, or `None` if it lies outside of the domain.
    pub fn location_code(&self, x: f64, y: f64) -> Option<LocationCode> {
        if !self.contains(x, y) {
            return None;
        }
        let normalized = self.transform.forward(Coordinates::new(x, y));
        Some(LocationCode::new(normalized, self.max_levels))
    }

    /// The total number of stored elements.
    ///
    /// This walks every materialized node.
    pub fn len(&self) -> usize {
        self.root.total_count()
    }

    /// Returns `true` if no elements are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of materialized nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Remove all elements and drop every node below the root.
    pub fn clear(&mut self) {
        debug!(removed = self.len(), "clearing quad tree");
        self.root = QuadNode::root(self.max_levels);
    }

    /// Insert an element at the given point.
    ///
    /// Returns the position of the stored element, or `None` without touching the tree if the
    /// point lies outside of the domain.
    pub fn insert(&mut self, x: f64, y: f64, value: T) -> Option<Position> {
        let Some(code) = self.location_code(x, y) else {
            trace!(x, y, "point outside of the domain, not inserting");
            return None;
        };
        Some(self.insert_entry(Entry {
            code,
            point: Coordinates::new(x, y),
            value,
        }))
    }

    /// Insert an element at the given coordinate.
    ///
    /// See [`insert`][Self::insert].
    pub fn insert_coord(&mut self, coord: &impl CoordTrait<T = f64>, value: T) -> Option<Position> {
        self.insert(coord.x(), coord.y(), value)
    }

    fn insert_entry(&mut self, entry: Entry<T>) -> Position {
        let code = entry.code;
        let capacity = self.capacity;
        let mut path = NodePath::new();

        let mut node = &mut self.root;
        while node.has_children() {
            let quadrant = code.quadrant(node.level());
            path.push(quadrant.index() as u8);
            node = node.child_mut(quadrant);
        }

        // Each full bucket on the way down is pushed one level deeper, until the new element
        // lands in a bucket with room or at level 0.
        while capacity > 0 && node.level() > 0 && node.count() >= capacity {
            node.subdivide();
            let quadrant = code.quadrant(node.level());
            path.push(quadrant.index() as u8);
            node = node.child_mut(quadrant);
        }

        let index = node.push(entry);
        Position::at(path, index)
    }

    /// Remove every element stored in the same lattice cell as the given point.
    ///
    /// All coincident insertions are removed at once. Returns the number of removed elements,
    /// which is zero if the point lies outside of the domain. Nodes are never merged or removed.
    pub fn erase(&mut self, x: f64, y: f64) -> usize {
        let Some(code) = self.location_code(x, y) else {
            return 0;
        };
        let mut path = NodePath::new();
        self.root.resolve_path(&code, &mut path);
        let removed = self
            .root
            .descend_mut(&path)
            .map_or(0, |node| node.erase(&code));
        trace!(x, y, removed, "erased elements");
        removed
    }

    /// Remove every element stored in the same lattice cell as the given coordinate.
    ///
    /// See [`erase`][Self::erase].
    pub fn erase_coord(&mut self, coord: &impl CoordTrait<T = f64>) -> usize {
        self.erase(coord.x(), coord.y())
    }

    /// The elements stored in the bucket the given point currently resolves to.
    ///
    /// This is not a radius search. It only reports what shares the point's current bucket, so
    /// neighbours just across a node boundary are never included, and the result for a fixed
    /// point changes as nodes subdivide. Points outside of the domain give an empty result.
    pub fn near(&self, x: f64, y: f64) -> Near<'_, T> {
        let mut path = NodePath::new();
        let entries: &[Entry<T>] = match self.location_code(x, y) {
            Some(code) => {
                self.root.resolve_path(&code, &mut path);
                self.root.descend(&path).map_or(&[][..], |node| node.bucket())
            }
            None => &[],
        };
        Near {
            path,
            entries: entries.iter().enumerate(),
        }
    }

    /// The elements stored in the bucket the given coordinate currently resolves to.
    ///
    /// See [`near`][Self::near].
    pub fn near_coord(&self, coord: &impl CoordTrait<T = f64>) -> Near<'_, T> {
        self.near(coord.x(), coord.y())
    }

    /// A cursor on the first element, or on the end position if the tree is empty.
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(self, first_position(&self.root))
    }

    /// A cursor on the end position.
    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(self, Position::end())
    }

    /// A cursor on the given position.
    pub fn cursor_at(&self, position: Position) -> Cursor<'_, T> {
        Cursor::new(self, position)
    }

    /// The element at `position`, or `None` for the end position or a stale position.
    pub fn get(&self, position: &Position) -> Option<&T> {
        entry_at(&self.root, position).map(|entry| &entry.value)
    }

    /// Mutable access to the element at `position`.
    pub fn get_mut(&mut self, position: &Position) -> Option<&mut T> {
        entry_at_mut(&mut self.root, position).map(|entry| &mut entry.value)
    }

    /// The point the element at `position` was inserted at.
    pub fn point(&self, position: &Position) -> Option<Coordinates> {
        entry_at(&self.root, position).map(|entry| entry.point)
    }

    /// Iterate over all elements in traversal order.
    ///
    /// Within a node elements come in insertion order; children follow in canonical quadrant
    /// order `(0, 0) < (0, 1) < (1, 0) < (1, 1)`, recursively.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(&self.root)
    }

    pub(crate) fn root(&self) -> &QuadNode<T> {
        &self.root
    }
}

impl<'a, T> IntoIterator for &'a QuadTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The elements sharing a single bucket, in insertion order.
///
/// Created by [`QuadTree::near`].
pub struct Near<'a, T> {
    path: NodePath,
    entries: std::iter::Enumerate<std::slice::Iter<'a, Entry<T>>>,
}

impl<'a, T> Near<'a, T> {
    /// Iterate over the stored points together with their elements.
    pub fn with_points(self) -> impl DoubleEndedIterator<Item = (Coordinates, &'a T)> {
        self.entries.map(|(_, entry)| (entry.point, &entry.value))
    }

    /// Iterate over the positions of the elements together with the elements.
    ///
    /// The positions can be passed to [`QuadTree::cursor_at`] to continue iterating from there.
    pub fn with_positions(self) -> impl DoubleEndedIterator<Item = (Position, &'a T)> {
        let path = self.path;
        self.entries
            .map(move |(index, entry)| (Position::at(path.clone(), index), &entry.value))
    }

    /// The path of the node whose bucket is being iterated.
    pub fn path(&self) -> &[u8] {
        &self.path
    }
}

impl<'a, T> Iterator for Near<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(|(_, entry)| &entry.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<T> DoubleEndedIterator for Near<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back().map(|(_, entry)| &entry.value)
    }
}

impl<T> ExactSizeIterator for Near<'_, T> {}

impl<T> FusedIterator for Near<'_, T> {}

impl<T> fmt::Debug for Near<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Near")
            .field("path", &self.path)
            .field("remaining", &self.entries.len())
            .finish()
    }
}
