//! Linearization of the tree into a stable, bidirectional node order.
//!
//! Nodes are addressed by their path from the root: the canonical quadrant index taken at each
//! level. The header sentinel that bounds the order on both ends is represented by `None`, so that
//! it can never be confused with a real node.
//!
//! The order is a depth-first pre-order that visits the children of every node in canonical
//! quadrant order `0 -> 1 -> 2 -> 3`:
//!
//! ```text
//! header -> root -> root/0 -> root/0/... -> root/1 -> ... -> root/3/... -> header
//! ```
//!
//! The functions here return nodes whether or not they hold any elements. Skipping empty nodes is
//! left to the cursors built on top of them.

use tinyvec::TinyVec;

use crate::quadtree::node::QuadNode;

/// A sequence of canonical quadrant indices leading from the root to a node.
///
/// A tree has at most 32 levels, so a path never spills onto the heap.
pub type NodePath = TinyVec<[u8; 32]>;

/// The node following `from` in traversal order.
///
/// The successor of the header is the root, and the successor of the last node is the header.
pub(crate) fn next_node<T>(root: &QuadNode<T>, from: Option<&NodePath>) -> Option<NodePath> {
    let Some(from) = from else {
        return Some(NodePath::new());
    };
    let mut path = from.clone();
    let node = root.descend(&path)?;

    if let Some(index) = first_child(node) {
        debug_assert!(node.child_at(index).is_some_and(|child| child.is_child_of(node)));
        path.push(index as u8);
        return Some(path);
    }

    // Climb until an ancestor has a child after the one we came from.
    while let Some(last) = path.pop() {
        let parent = root.descend(&path)?;
        if let Some(index) = (usize::from(last) + 1..4).find(|&i| parent.child_at(i).is_some()) {
            path.push(index as u8);
            return Some(path);
        }
    }

    None
}

/// The node preceding `from` in traversal order. This is the exact inverse of [`next_node`].
///
/// The predecessor of the header is the deepest, right-most node of the tree, and the predecessor
/// of the root is the header.
pub(crate) fn previous_node<T>(root: &QuadNode<T>, from: Option<&NodePath>) -> Option<NodePath> {
    let Some(from) = from else {
        let mut path = NodePath::new();
        push_last_descendant(root, &mut path);
        return Some(path);
    };

    let mut path = from.clone();
    let last = path.pop()?;
    let parent = root.descend(&path)?;

    match (0..usize::from(last))
        .rev()
        .find_map(|i| parent.child_at(i).map(|child| (i, child)))
    {
        Some((index, sibling)) => {
            path.push(index as u8);
            push_last_descendant(sibling, &mut path);
            Some(path)
        }
        // No earlier sibling: the parent itself comes right before us.
        None => Some(path),
    }
}

/// The lowest canonical index of an existing child.
#[inline]
fn first_child<T>(node: &QuadNode<T>) -> Option<usize> {
    (0..4).find(|&i| node.child_at(i).is_some())
}

/// Extend `path` down to the deepest descendant of `node`, always preferring the highest-indexed
/// existing child.
fn push_last_descendant<T>(node: &QuadNode<T>, path: &mut NodePath) {
    let mut node = node;
    while let Some((index, child)) = (0..4)
        .rev()
        .find_map(|i| node.child_at(i).map(|child| (i, child)))
    {
        path.push(index as u8);
        node = child;
    }
}
