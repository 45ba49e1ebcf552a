//! Route frequency index backed by an AVL tree.
//!
//! Keys are canonical route strings; each node counts how often that route was
//! flown. Nodes are exclusively owned by their parent (`Option<Box<Node>>`)
//! and rotations move ownership instead of aliasing.

use std::cmp::Ordering;

use serde::Serialize;

use crate::error::{Error, Result};

type Link = Option<Box<Node>>;

#[derive(Debug, Clone)]
struct Node {
    key: String,
    frequency: u64,
    height: i32,
    left: Link,
    right: Link,
}

impl Node {
    fn leaf(key: String, frequency: u64) -> Box<Self> {
        Box::new(Self {
            key,
            frequency,
            height: 0,
            left: None,
            right: None,
        })
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance_factor(&self) -> i32 {
        height(&self.left) - height(&self.right)
    }
}

fn height(link: &Link) -> i32 {
    link.as_ref().map_or(-1, |node| node.height)
}

/// Balanced index from route key to usage frequency.
#[derive(Debug, Clone, Default)]
pub struct RouteFrequencyTree {
    root: Link,
    len: usize,
    total: u64,
}

impl RouteFrequencyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one use of `key`, inserting it with frequency 1 when absent.
    pub fn insert(&mut self, key: impl Into<String>) {
        self.insert_with_frequency(key, 1);
    }

    /// Add `frequency` uses of `key` at once.
    ///
    /// A zero frequency still inserts an absent key so it shows up in
    /// enumeration.
    pub fn insert_with_frequency(&mut self, key: impl Into<String>, frequency: u64) {
        let root = self.root.take();
        let (root, inserted) = insert_node(root, key.into(), frequency);
        self.root = Some(root);
        if inserted {
            self.len += 1;
        }
        self.total += frequency;
    }

    pub fn frequency(&self, key: &str) -> Option<u64> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(node.key.as_str()) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(node.frequency),
            };
        }
        None
    }

    pub fn contains(&self, key: &str) -> bool {
        self.frequency(key).is_some()
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the tree; `-1` when empty.
    pub fn height(&self) -> i32 {
        height(&self.root)
    }

    /// Sum of all frequencies.
    pub fn total_frequency(&self) -> u64 {
        self.total
    }

    /// `(key, frequency)` pairs in ascending key order.
    pub fn in_order(&self) -> Vec<(String, u64)> {
        let mut entries = Vec::with_capacity(self.len);
        let mut stack: Vec<&Node> = Vec::new();
        let mut current = self.root.as_deref();
        while current.is_some() || !stack.is_empty() {
            while let Some(node) = current {
                stack.push(node);
                current = node.left.as_deref();
            }
            if let Some(node) = stack.pop() {
                entries.push((node.key.clone(), node.frequency));
                current = node.right.as_deref();
            }
        }
        entries
    }

    /// The `k` most frequent entries, ties broken by ascending key.
    pub fn top_k(&self, k: usize) -> Vec<(String, u64)> {
        let mut entries = self.in_order();
        // in_order is already sorted by key, so a stable sort keeps key order
        // within equal frequencies.
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(k);
        entries
    }

    /// Verify BST ordering, cached heights and balance factors of every node.
    pub fn check_invariants(&self) -> Result<()> {
        let mut count = 0usize;
        check_node(&self.root, None, None, &mut count)?;
        if count != self.len {
            return Err(Error::invariant(format!(
                "tree holds {count} nodes but reports {}",
                self.len
            )));
        }
        Ok(())
    }

    /// Serializable view of the tree shape, for visualisation.
    pub fn snapshot(&self) -> Option<TreeSnapshot> {
        self.root.as_deref().map(TreeSnapshot::from_node)
    }
}

/// Recursive view of a node and its subtrees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeSnapshot {
    pub key: String,
    pub frequency: u64,
    pub height: i32,
    pub balance_factor: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left: Option<Box<TreeSnapshot>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right: Option<Box<TreeSnapshot>>,
}

impl TreeSnapshot {
    fn from_node(node: &Node) -> Self {
        Self {
            key: node.key.clone(),
            frequency: node.frequency,
            height: node.height,
            balance_factor: node.balance_factor(),
            left: node.left.as_deref().map(|n| Box::new(Self::from_node(n))),
            right: node.right.as_deref().map(|n| Box::new(Self::from_node(n))),
        }
    }
}

fn insert_node(link: Link, key: String, frequency: u64) -> (Box<Node>, bool) {
    let Some(mut node) = link else {
        return (Node::leaf(key, frequency), true);
    };

    let inserted = match key.cmp(&node.key) {
        Ordering::Less => {
            let (child, inserted) = insert_node(node.left.take(), key, frequency);
            node.left = Some(child);
            inserted
        }
        Ordering::Greater => {
            let (child, inserted) = insert_node(node.right.take(), key, frequency);
            node.right = Some(child);
            inserted
        }
        Ordering::Equal => {
            // Key order is unchanged, no rebalancing needed.
            node.frequency += frequency;
            return (node, false);
        }
    };

    node.update_height();
    (rebalance(node), inserted)
}

fn rebalance(mut node: Box<Node>) -> Box<Node> {
    let balance = node.balance_factor();
    if balance > 1 {
        // Left-right case first turns into left-left.
        if node.left.as_ref().is_some_and(|left| left.balance_factor() < 0) {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }
    if balance < -1 {
        // Right-left case first turns into right-right.
        if node.right.as_ref().is_some_and(|right| right.balance_factor() > 0) {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }
    node
}

fn rotate_right(mut node: Box<Node>) -> Box<Node> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

fn rotate_left(mut node: Box<Node>) -> Box<Node> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

fn check_node(
    link: &Link,
    lower: Option<&str>,
    upper: Option<&str>,
    count: &mut usize,
) -> Result<i32> {
    let Some(node) = link else {
        return Ok(-1);
    };
    *count += 1;

    if lower.is_some_and(|bound| node.key.as_str() <= bound)
        || upper.is_some_and(|bound| node.key.as_str() >= bound)
    {
        return Err(Error::invariant(format!(
            "key {:?} breaks search tree ordering",
            node.key
        )));
    }

    let left = check_node(&node.left, lower, Some(node.key.as_str()), count)?;
    let right = check_node(&node.right, Some(node.key.as_str()), upper, count)?;
    let expected = 1 + left.max(right);
    if node.height != expected {
        return Err(Error::invariant(format!(
            "node {:?} caches height {} but has height {expected}",
            node.key, node.height
        )));
    }
    if (left - right).abs() > 1 {
        return Err(Error::invariant(format!(
            "node {:?} has balance factor {}",
            node.key,
            left - right
        )));
    }
    Ok(expected)
}
