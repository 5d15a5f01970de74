//! Ordered multiset of exam grades for a single student.
//!
//! An unbalanced binary search tree of exclusively owned boxed nodes.
//! Values smaller than a node go left, everything else (ties included)
//! goes right, so equal grades end up grouped on in-order traversal.

use std::fmt;

/// A single exam grade.
pub type Grade = i32;

#[derive(Debug, Clone)]
struct GradeNode {
    value: Grade,
    left: Option<Box<GradeNode>>,
    right: Option<Box<GradeNode>>,
}

impl GradeNode {
    fn new(value: Grade) -> Self {
        Self {
            value,
            left: None,
            right: None,
        }
    }
}

/// Grades of one student; grows by insertion only.
#[derive(Debug, Clone, Default)]
pub struct GradeMultiset {
    root: Option<Box<GradeNode>>,
    len: usize,
}

impl GradeMultiset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` as a new leaf. Ties descend to the right.
    pub fn insert(&mut self, value: Grade) {
        Self::insert_at(&mut self.root, value);
        self.len += 1;
    }

    fn insert_at(slot: &mut Option<Box<GradeNode>>, value: Grade) {
        match slot {
            None => *slot = Some(Box::new(GradeNode::new(value))),
            Some(node) => {
                if value < node.value {
                    Self::insert_at(&mut node.left, value)
                } else {
                    Self::insert_at(&mut node.right, value)
                }
            }
        }
    }

    /// True iff every grade equals `value`. Vacuously true when empty.
    pub fn all_equal(&self, value: Grade) -> bool {
        fn walk(node: Option<&GradeNode>, value: Grade) -> bool {
            match node {
                None => true,
                Some(n) if n.value != value => false,
                Some(n) => walk(n.left.as_deref(), value) && walk(n.right.as_deref(), value),
            }
        }
        walk(self.root.as_deref(), value)
    }

    /// True iff at least one grade equals `value`.
    pub fn any_equal(&self, value: Grade) -> bool {
        fn walk(node: Option<&GradeNode>, value: Grade) -> bool {
            match node {
                None => false,
                Some(n) if n.value == value => true,
                Some(n) => walk(n.left.as_deref(), value) || walk(n.right.as_deref(), value),
            }
        }
        walk(self.root.as_deref(), value)
    }

    /// Number of grades equal to `value`.
    pub fn count_equal(&self, value: Grade) -> usize {
        fn walk(node: Option<&GradeNode>, value: Grade) -> usize {
            match node {
                None => 0,
                Some(n) => {
                    usize::from(n.value == value)
                        + walk(n.left.as_deref(), value)
                        + walk(n.right.as_deref(), value)
                }
            }
        }
        walk(self.root.as_deref(), value)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// In-order iteration: ascending, ties grouped.
    pub fn iter(&self) -> GradeIter<'_> {
        GradeIter::new(self.root.as_deref())
    }
}

impl FromIterator<Grade> for GradeMultiset {
    fn from_iter<I: IntoIterator<Item = Grade>>(iter: I) -> Self {
        let mut grades = Self::new();
        for grade in iter {
            grades.insert(grade);
        }
        grades
    }
}

impl<'a> IntoIterator for &'a GradeMultiset {
    type Item = Grade;
    type IntoIter = GradeIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Space separated, each grade followed by a single space.
impl fmt::Display for GradeMultiset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for grade in self {
            write!(f, "{} ", grade)?;
        }
        Ok(())
    }
}

pub struct GradeIter<'a> {
    stack: Vec<&'a GradeNode>,
}

impl<'a> GradeIter<'a> {
    fn new(root: Option<&'a GradeNode>) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut node: Option<&'a GradeNode>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.left.as_deref();
        }
    }
}

impl Iterator for GradeIter<'_> {
    type Item = Grade;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some(node.value)
    }
}
