//! The nodes of the quadtree hierarchy.

use tracing::trace;

use crate::coords::Coordinates;
use crate::quadtree::location::{LocationCode, Quadrant};

/// An element together with the location it was inserted at.
#[derive(Debug, Clone)]
pub(crate) struct Entry<T> {
    pub(crate) code: LocationCode,
    pub(crate) point: Coordinates,
    pub(crate) value: T,
}

/// A node in the quadtree.
///
/// Every node owns its (up to four) children, which are created lazily the first time a point is
/// routed into their quadrant. Nodes are never removed individually; the whole hierarchy is dropped
/// together with its root.
#[derive(Debug, Clone)]
pub(crate) struct QuadNode<T> {
    /// Root is `max_levels - 1`, decreasing towards 0. Level 0 nodes never have children.
    level: u32,

    /// Only the bits above `level` are meaningful; they describe the region of this node.
    code: LocationCode,

    /// Elements stored directly at this node, in insertion order.
    bucket: Vec<Entry<T>>,

    children: [Option<Box<QuadNode<T>>>; 4],
}

impl<T> QuadNode<T> {
    pub(crate) fn new(level: u32, code: LocationCode) -> Self {
        Self {
            level,
            code,
            bucket: Vec::new(),
            children: [None, None, None, None],
        }
    }

    /// The root node of a tree with `max_levels` levels.
    pub(crate) fn root(max_levels: u32) -> Self {
        Self::new(max_levels - 1, LocationCode::root(max_levels))
    }

    #[inline]
    pub(crate) fn level(&self) -> u32 {
        self.level
    }

    /// The number of elements stored directly at this node.
    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.bucket.len()
    }

    /// The number of elements stored at this node and all of its descendants.
    pub(crate) fn total_count(&self) -> usize {
        self.bucket.len()
            + self
                .children
                .iter()
                .flatten()
                .map(|child| child.total_count())
                .sum::<usize>()
    }

    /// The number of materialized nodes in this subtree, including this one.
    pub(crate) fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .flatten()
            .map(|child| child.node_count())
            .sum::<usize>()
    }

    #[inline]
    pub(crate) fn bucket(&self) -> &[Entry<T>] {
        &self.bucket
    }

    #[inline]
    pub(crate) fn bucket_mut(&mut self) -> &mut [Entry<T>] {
        &mut self.bucket
    }

    #[inline]
    pub(crate) fn has_children(&self) -> bool {
        self.children.iter().any(Option::is_some)
    }

    /// The child at a canonical quadrant index, if it has been materialized.
    #[inline]
    pub(crate) fn child_at(&self, index: usize) -> Option<&QuadNode<T>> {
        self.children.get(index)?.as_deref()
    }

    /// The child in `quadrant`, created if it does not exist yet.
    ///
    /// A level 0 node has nothing finer to address and returns itself.
    pub(crate) fn child_mut(&mut self, quadrant: Quadrant) -> &mut QuadNode<T> {
        if self.level == 0 {
            return self;
        }
        let level = self.level - 1;
        let code = self.code.with_quadrant(self.level, quadrant);
        self.children[quadrant.index()].get_or_insert_with(|| Box::new(QuadNode::new(level, code)))
    }

    /// The child in `quadrant` if it exists, otherwise this node. Never modifies the tree.
    pub(crate) fn existing_child(&self, quadrant: Quadrant) -> &QuadNode<T> {
        self.children[quadrant.index()].as_deref().unwrap_or(self)
    }

    /// Returns `true` if this node lies strictly below `ancestor` in the region it describes.
    pub(crate) fn is_child_of(&self, ancestor: &QuadNode<T>) -> bool {
        self.level < ancestor.level && self.code.shares_prefix(&ancestor.code, ancestor.level)
    }

    /// Append the canonical quadrant indices taken when walking materialized children along
    /// `code`. Never creates nodes; stops at the first node with no matching child.
    pub(crate) fn resolve_path(&self, code: &LocationCode, path: &mut impl Extend<u8>) {
        let mut node = self;
        while node.level > 0 {
            let quadrant = code.quadrant(node.level);
            let next = node.existing_child(quadrant);
            if std::ptr::eq(next, node) {
                break;
            }
            path.extend(Some(quadrant.index() as u8));
            node = next;
        }
    }

    /// Follow a path of canonical quadrant indices through materialized children.
    ///
    /// Returns `None` if the path leaves the materialized tree.
    pub(crate) fn descend(&self, path: &[u8]) -> Option<&QuadNode<T>> {
        path.iter()
            .try_fold(self, |node, &index| node.child_at(usize::from(index)))
    }

    /// Mutable version of [`descend`][Self::descend].
    pub(crate) fn descend_mut(&mut self, path: &[u8]) -> Option<&mut QuadNode<T>> {
        let mut node = self;
        for &index in path {
            match node.children.get_mut(usize::from(index)) {
                Some(Some(child)) => node = &mut **child,
                _ => return None,
            }
        }
        Some(node)
    }

    /// Append an element to this node's bucket and return its index within the bucket.
    pub(crate) fn push(&mut self, entry: Entry<T>) -> usize {
        self.bucket.push(entry);
        self.bucket.len() - 1
    }

    /// Move every element of this node's bucket into the child its code resolves to.
    ///
    /// Only the children that receive elements are created.
    pub(crate) fn subdivide(&mut self) {
        debug_assert!(self.level > 0, "level 0 nodes never subdivide");
        let level = self.level;
        let entries = std::mem::take(&mut self.bucket);
        trace!(level, moved = entries.len(), "subdividing quad node");
        for entry in entries {
            let quadrant = entry.code.quadrant(level);
            self.child_mut(quadrant).bucket.push(entry);
        }
    }

    /// Remove every element whose code equals `code`, returning how many were removed.
    pub(crate) fn erase(&mut self, code: &LocationCode) -> usize {
        let before = self.bucket.len();
        self.bucket.retain(|entry| entry.code != *code);
        before - self.bucket.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(x: f64, y: f64, max_levels: u32, value: i32) -> Entry<i32> {
        let point = Coordinates::new(x, y);
        Entry {
            code: LocationCode::new(point, max_levels),
            point,
            value,
        }
    }

    #[test]
    fn new_root_is_an_empty_leaf() {
        let root = QuadNode::<i32>::root(10);
        assert_eq!(root.level(), 9);
        assert_eq!(root.count(), 0);
        assert_eq!(root.total_count(), 0);
        assert!(!root.has_children());
        assert_eq!(root.node_count(), 1);
    }

    #[test]
    fn child_is_created_once() {
        let mut root = QuadNode::<i32>::root(3);
        let quadrant = Quadrant::new(true, false);
        root.child_mut(quadrant).push(entry(0.6, 0.1, 3, 1));
        root.child_mut(quadrant).push(entry(0.6, 0.1, 3, 2));

        assert!(root.has_children());
        assert_eq!(root.node_count(), 2);
        let child = root.child_at(quadrant.index()).unwrap();
        assert_eq!(child.level(), 1);
        assert_eq!(child.count(), 2);
        assert_eq!(child.code.x(), 0b100);
        assert_eq!(child.code.y(), 0);
        assert_eq!(child.code.to_string(), "(100, 000)");
    }

    #[test]
    fn level_0_child_is_the_node_itself() {
        let mut leaf = QuadNode::<i32>::new(0, LocationCode::root(3));
        leaf.child_mut(Quadrant::new(true, true)).push(entry(0.9, 0.9, 3, 7));
        assert_eq!(leaf.count(), 1);
        assert!(!leaf.has_children());
    }

    #[test]
    fn existing_child_never_creates() {
        let root = QuadNode::<i32>::root(4);
        let found = root.existing_child(Quadrant::new(false, true));
        assert!(std::ptr::eq(found, &root));
        assert!(!root.has_children());
    }

    #[test]
    fn is_child_of() {
        let mut root = QuadNode::<i32>::root(4);
        let upper = Quadrant::new(true, true);
        let lower = Quadrant::new(false, false);
        root.child_mut(upper).child_mut(lower);
        root.child_mut(lower);

        let root_ref = &root;
        let upper_child = root_ref.child_at(upper.index()).unwrap();
        let grandchild = upper_child.child_at(lower.index()).unwrap();
        let lower_child = root_ref.child_at(lower.index()).unwrap();

        assert!(upper_child.is_child_of(root_ref));
        assert!(grandchild.is_child_of(root_ref));
        assert!(grandchild.is_child_of(upper_child));
        assert!(!grandchild.is_child_of(lower_child));
        assert!(!root_ref.is_child_of(upper_child));
        assert!(!upper_child.is_child_of(upper_child));
    }

    #[test]
    fn subdivide_moves_elements_into_children() {
        let mut root = QuadNode::root(3);
        root.push(entry(0.1, 0.1, 3, 1));
        root.push(entry(0.9, 0.1, 3, 2));
        root.push(entry(0.2, 0.3, 3, 3));
        root.subdivide();

        assert_eq!(root.count(), 0);
        assert_eq!(root.total_count(), 3);
        // Only the two quadrants that received elements are materialized.
        assert_eq!(root.node_count(), 3);

        let first = root.child_at(0).unwrap();
        let values: Vec<i32> = first.bucket().iter().map(|e| e.value).collect();
        assert_eq!(values, vec![1, 3]);
        assert_eq!(root.child_at(2).unwrap().count(), 1);
        assert!(root.child_at(1).is_none());
    }

    #[test]
    fn resolve_follows_existing_children_only() {
        let mut root = QuadNode::root(3);
        root.push(entry(0.1, 0.1, 3, 1));
        root.subdivide();

        let code = LocationCode::new(Coordinates::new(0.1, 0.2), 3);
        let mut path = Vec::new();
        root.resolve_path(&code, &mut path);
        assert_eq!(path, vec![0]);
        assert_eq!(root.descend(&path).unwrap().level(), 1);

        // Nothing was materialized in quadrant 3, so the root is the answer.
        let code = LocationCode::new(Coordinates::new(0.9, 0.9), 3);
        let mut path = Vec::new();
        root.resolve_path(&code, &mut path);
        assert!(path.is_empty());
        assert_eq!(root.node_count(), 2);
        assert!(root.descend(&[3]).is_none());
        assert!(root.descend_mut(&[3]).is_none());
        assert!(root.descend_mut(&[0]).is_some());
    }

    #[test]
    fn erase_removes_all_matching_codes() {
        let mut node = QuadNode::root(4);
        node.push(entry(0.25, 0.25, 4, 1));
        node.push(entry(0.5, 0.25, 4, 2));
        node.push(entry(0.25, 0.25, 4, 3));

        let code = LocationCode::new(Coordinates::new(0.25, 0.25), 4);
        assert_eq!(node.erase(&code), 2);
        assert_eq!(node.count(), 1);
        assert_eq!(node.bucket()[0].value, 2);
        assert_eq!(node.erase(&code), 0);
    }
}
