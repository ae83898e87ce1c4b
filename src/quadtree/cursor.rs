//! Positions, cursors and iterators over the elements of a [`QuadTree`].

use std::fmt;
use std::iter::FusedIterator;

use crate::coords::Coordinates;
use crate::quadtree::node::{Entry, QuadNode};
use crate::quadtree::traversal::{next_node, previous_node, NodePath};
use crate::quadtree::QuadTree;

/// A location in the iteration order of a tree: either an element, addressed by the path to its
/// node and its index within that node's bucket, or the end position.
///
/// The end position sits both after the last and before the first element. A position does not
/// borrow the tree; it is invalidated by any later insertion or removal, after which
/// [`QuadTree::get`] may return `None` or a different element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Position {
    slot: Option<(NodePath, usize)>,
}

impl Position {
    pub(crate) fn at(path: NodePath, index: usize) -> Self {
        Self {
            slot: Some((path, index)),
        }
    }

    /// The end position.
    pub fn end() -> Self {
        Self { slot: None }
    }

    /// Returns `true` for the end position.
    pub fn is_end(&self) -> bool {
        self.slot.is_none()
    }

    /// The canonical quadrant indices leading from the root to the element's node.
    pub fn path(&self) -> Option<&[u8]> {
        self.slot.as_ref().map(|(path, _)| path.as_slice())
    }

    /// The index of the element within its node's bucket.
    pub fn index(&self) -> Option<usize> {
        self.slot.as_ref().map(|(_, index)| *index)
    }
}

/// The element stored at `position`, if the position is still valid.
pub(crate) fn entry_at<'a, T>(root: &'a QuadNode<T>, position: &Position) -> Option<&'a Entry<T>> {
    let (path, index) = position.slot.as_ref()?;
    root.descend(path)?.bucket().get(*index)
}

pub(crate) fn entry_at_mut<'a, T>(
    root: &'a mut QuadNode<T>,
    position: &Position,
) -> Option<&'a mut Entry<T>> {
    let (path, index) = position.slot.as_ref()?;
    root.descend_mut(path)?.bucket_mut().get_mut(*index)
}

/// The first element position in traversal order, or the end position for an empty tree.
pub(crate) fn first_position<T>(root: &QuadNode<T>) -> Position {
    settle_forward(root, NodePath::new(), 0)
}

/// Starting at `index` within the node at `path`, find the first valid element position, moving
/// on to following nodes when the bucket is exhausted.
fn settle_forward<T>(root: &QuadNode<T>, mut path: NodePath, mut index: usize) -> Position {
    loop {
        let Some(node) = root.descend(&path) else {
            return Position::end();
        };
        if index < node.count() {
            return Position::at(path, index);
        }
        match next_node(root, Some(&path)) {
            Some(next) => {
                path = next;
                index = 0;
            }
            None => return Position::end(),
        }
    }
}

/// The position after `position`. The end position stays where it is.
pub(crate) fn next_position<T>(root: &QuadNode<T>, position: &Position) -> Position {
    match &position.slot {
        Some((path, index)) => settle_forward(root, path.clone(), index + 1),
        None => Position::end(),
    }
}

/// The position before `position`. Moving back from the end lands on the last element, moving
/// back from the first element lands on the end.
pub(crate) fn previous_position<T>(root: &QuadNode<T>, position: &Position) -> Position {
    if let Some((path, index)) = &position.slot {
        if *index > 0 {
            return Position::at(path.clone(), index - 1);
        }
    }

    let mut current = position.slot.as_ref().map(|(path, _)| path.clone());
    loop {
        current = previous_node(root, current.as_ref());
        let Some(path) = &current else {
            return Position::end();
        };
        match root.descend(path) {
            Some(node) if node.count() > 0 => return Position::at(path.clone(), node.count() - 1),
            Some(_) => {}
            None => return Position::end(),
        }
    }
}

/// A cursor over the elements of a [`QuadTree`].
///
/// Cursors move bidirectionally through the canonical traversal order and may rest on the end
/// position, where [`current`][Cursor::current] returns `None`.
pub struct Cursor<'a, T> {
    tree: &'a QuadTree<T>,
    position: Position,
}

impl<'a, T> Cursor<'a, T> {
    pub(crate) fn new(tree: &'a QuadTree<T>, position: Position) -> Self {
        Self { tree, position }
    }

    /// The element under the cursor, or `None` at the end position.
    pub fn current(&self) -> Option<&'a T> {
        entry_at(self.tree.root(), &self.position).map(|entry| &entry.value)
    }

    /// The point the element under the cursor was inserted at.
    pub fn current_point(&self) -> Option<Coordinates> {
        entry_at(self.tree.root(), &self.position).map(|entry| entry.point)
    }

    /// The position of the cursor.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Consume the cursor, keeping only its position.
    pub fn into_position(self) -> Position {
        self.position
    }

    /// Returns `true` if the cursor rests on the end position.
    pub fn is_end(&self) -> bool {
        self.position.is_end()
    }

    /// Move to the next element. At the end position this does nothing.
    pub fn move_next(&mut self) {
        self.position = next_position(self.tree.root(), &self.position);
    }

    /// Move to the previous element. From the end position this moves onto the last element;
    /// from the first element it moves onto the end position.
    pub fn move_prev(&mut self) {
        self.position = previous_position(self.tree.root(), &self.position);
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            position: self.position.clone(),
        }
    }
}

impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.position == other.position
    }
}

impl<T> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("position", &self.position)
            .finish()
    }
}

/// A double-ended iterator over all elements of a [`QuadTree`] in traversal order.
///
/// Created by [`QuadTree::iter`].
pub struct Iter<'a, T> {
    root: &'a QuadNode<T>,
    front: Position,
    back: Position,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(root: &'a QuadNode<T>) -> Self {
        Self {
            root,
            front: first_position(root),
            back: Position::end(),
            remaining: root.total_count(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let entry = entry_at(self.root, &self.front)?;
        self.front = next_position(self.root, &self.front);
        self.remaining -= 1;
        Some(&entry.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.back = previous_position(self.root, &self.back);
        let entry = entry_at(self.root, &self.back)?;
        self.remaining -= 1;
        Some(&entry.value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("front", &self.front)
            .field("back", &self.back)
            .field("remaining", &self.remaining)
            .finish()
    }
}
