use std::cmp::Ordering;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace};

use crate::domain::record::StudentRecord;

/// Node of the directory tree, stored in the arena.
#[derive(Debug, Clone)]
pub struct DirectoryNode {
    /// Student held by this node
    pub record: StudentRecord,
    /// Subtree with strictly smaller surnames
    pub left: Option<Index>,
    /// Subtree with greater or equal surnames
    pub right: Option<Index>,
}

impl DirectoryNode {
    fn new(record: StudentRecord) -> Self {
        Self {
            record,
            left: None,
            right: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Student directory: unbalanced binary search tree keyed by surname.
///
/// Nodes live in a generational arena and refer to their children by index.
/// Surnames compare lexicographically; ties go right, so a second student
/// with the same surname is kept alongside the first rather than replacing it.
#[derive(Debug, Clone)]
pub struct StudentDirectory {
    /// Arena storage for all tree nodes
    arena: Arena<DirectoryNode>,
    /// Index of the root node, None for an empty directory
    root: Option<Index>,
}

impl Default for StudentDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentDirectory {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    #[instrument(level = "trace", skip(self))]
    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn get_node(&self, idx: Index) -> Option<&DirectoryNode> {
        self.arena.get(idx)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.root = None;
    }

    /// Ordered insert by surname.
    #[instrument(level = "debug", skip(self, record), fields(surname = record.surname()))]
    pub fn add(&mut self, record: StudentRecord) {
        let mut parent = None;
        let mut cursor = self.root;
        while let Some((idx, node)) = self.node_at(cursor) {
            if record.surname() < node.record.surname() {
                parent = Some((idx, Side::Left));
                cursor = node.left;
            } else {
                parent = Some((idx, Side::Right));
                cursor = node.right;
            }
        }

        let idx = self.arena.insert(DirectoryNode::new(record));
        self.set_child(parent, Some(idx));
    }

    /// Removes one student with `surname`, the first one met on the search path.
    ///
    /// Returns false and leaves the tree untouched if nobody has that surname.
    /// A node with two children takes over the record of its in-order
    /// successor, which is then spliced out of the right subtree.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&mut self, surname: &str) -> bool {
        let mut parent = None;
        let mut cursor = self.root;
        let (target, left, right) = loop {
            let Some((idx, node)) = self.node_at(cursor) else {
                debug!("no student with surname {:?}", surname);
                return false;
            };
            match surname.cmp(node.record.surname()) {
                Ordering::Less => {
                    parent = Some((idx, Side::Left));
                    cursor = node.left;
                }
                Ordering::Greater => {
                    parent = Some((idx, Side::Right));
                    cursor = node.right;
                }
                Ordering::Equal => break (idx, node.left, node.right),
            }
        };

        match (left, right) {
            (None, child) | (child, None) => {
                trace!("splicing single child into place");
                self.arena.remove(target);
                self.set_child(parent, child);
            }
            (Some(_), Some(right)) => {
                if let Some(successor) = self.take_leftmost(target, right) {
                    trace!("replacing with successor {:?}", successor.surname());
                    if let Some(node) = self.arena.get_mut(target) {
                        node.record = successor;
                    }
                }
            }
        }
        true
    }

    /// Removes `surname` and then inserts `record`; a rename if the surnames differ.
    #[instrument(level = "debug", skip(self, record), fields(new_surname = record.surname()))]
    pub fn edit(&mut self, surname: &str, record: StudentRecord) -> bool {
        let removed = self.remove(surname);
        self.add(record);
        removed
    }

    /// First record with `surname` on the search path.
    pub fn find(&self, surname: &str) -> Option<&StudentRecord> {
        let mut cursor = self.root;
        while let Some((_, node)) = self.node_at(cursor) {
            cursor = match surname.cmp(node.record.surname()) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(&node.record),
            };
        }
        None
    }

    /// Renders of every record, ascending by surname.
    pub fn list_all(&self) -> Vec<String> {
        self.list_where(|_| true)
    }

    /// Renders of records satisfying `predicate`, in traversal order.
    pub fn list_where<P>(&self, predicate: P) -> Vec<String>
    where
        P: Fn(&StudentRecord) -> bool,
    {
        self.iter()
            .filter(|record| predicate(*record))
            .map(StudentRecord::render)
            .collect()
    }

    pub fn list_excellent(&self) -> Vec<String> {
        self.list_where(StudentRecord::is_excellent)
    }

    pub fn list_with_threes(&self) -> Vec<String> {
        self.list_where(StudentRecord::has_threes)
    }

    pub fn list_with_single_two(&self) -> Vec<String> {
        self.list_where(StudentRecord::has_single_two)
    }

    /// In-order traversal.
    pub fn iter(&self) -> InOrderIter<'_> {
        InOrderIter::new(self)
    }

    /// Node, then left subtree, then right subtree.
    pub fn iter_preorder(&self) -> PreOrderIter<'_> {
        PreOrderIter::new(self)
    }

    /// Longest root-to-leaf path in nodes, 0 when empty.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(Index, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((idx, level)) = stack.pop() {
            if let Some(node) = self.arena.get(idx) {
                deepest = deepest.max(level);
                stack.extend(node.left.map(|c| (c, level + 1)));
                stack.extend(node.right.map(|c| (c, level + 1)));
            }
        }
        deepest
    }

    fn node_at(&self, idx: Option<Index>) -> Option<(Index, &DirectoryNode)> {
        let idx = idx?;
        self.arena.get(idx).map(|node| (idx, node))
    }

    fn set_child(&mut self, parent: Option<(Index, Side)>, child: Option<Index>) {
        match parent {
            None => self.root = child,
            Some((idx, side)) => {
                if let Some(node) = self.arena.get_mut(idx) {
                    match side {
                        Side::Left => node.left = child,
                        Side::Right => node.right = child,
                    }
                }
            }
        }
    }

    /// Detaches the leftmost node of the subtree rooted at `start` (the right
    /// child of `owner`) and returns its record.
    fn take_leftmost(&mut self, owner: Index, start: Index) -> Option<StudentRecord> {
        let mut parent = (owner, Side::Right);
        let mut current = start;
        while let Some(left) = self.arena.get(current)?.left {
            parent = (current, Side::Left);
            current = left;
        }
        let node = self.arena.remove(current)?;
        self.set_child(Some(parent), node.right);
        Some(node.record)
    }
}

pub struct InOrderIter<'a> {
    directory: &'a StudentDirectory,
    stack: Vec<&'a DirectoryNode>,
}

impl<'a> InOrderIter<'a> {
    fn new(directory: &'a StudentDirectory) -> Self {
        let mut iter = Self {
            directory,
            stack: Vec::new(),
        };
        iter.push_left_spine(directory.root);
        iter
    }

    fn push_left_spine(&mut self, mut cursor: Option<Index>) {
        let directory = self.directory;
        while let Some((_, node)) = directory.node_at(cursor) {
            self.stack.push(node);
            cursor = node.left;
        }
    }
}

impl<'a> Iterator for InOrderIter<'a> {
    type Item = &'a StudentRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right);
        Some(&node.record)
    }
}

pub struct PreOrderIter<'a> {
    directory: &'a StudentDirectory,
    stack: Vec<Index>,
}

impl<'a> PreOrderIter<'a> {
    fn new(directory: &'a StudentDirectory) -> Self {
        Self {
            directory,
            stack: directory.root.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PreOrderIter<'a> {
    type Item = &'a StudentRecord;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(idx) = self.stack.pop() {
            if let Some(node) = self.directory.arena.get(idx) {
                // Right first so the left subtree comes out first
                self.stack.extend(node.right);
                self.stack.extend(node.left);
                return Some(&node.record);
            }
        }
        None
    }
}

impl<'a> IntoIterator for &'a StudentDirectory {
    type Item = &'a StudentRecord;
    type IntoIter = InOrderIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<StudentRecord> for StudentDirectory {
    fn from_iter<I: IntoIterator<Item = StudentRecord>>(iter: I) -> Self {
        let mut directory = Self::new();
        for record in iter {
            directory.add(record);
        }
        directory
    }
}
