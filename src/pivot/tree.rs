//! Header trees and their leaf index.
//!
//! A pivot header is a forest of nodes. [`PivotTree`] flattens it into an
//! arena where each node knows its level, the index of its first leaf and
//! how many leaves it spans, so header cells can be located by leaf index.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    #[default]
    Member,
    Subtotal,
    Grandtotal,
}

/// A header node as delivered by the pivot service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotNode {
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PivotNode>,
    #[serde(default)]
    pub node_type: NodeType,
    /// Measure this header column shows, for measure headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure_index: Option<usize>,
}

impl PivotNode {
    pub fn member(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            children: Vec::new(),
            node_type: NodeType::Member,
            measure_index: None,
        }
    }

    pub fn subtotal(value: impl Into<String>) -> Self {
        Self {
            node_type: NodeType::Subtotal,
            ..Self::member(value)
        }
    }

    pub fn grandtotal(value: impl Into<String>) -> Self {
        Self {
            node_type: NodeType::Grandtotal,
            ..Self::member(value)
        }
    }

    pub fn with_children(mut self, children: Vec<PivotNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_measure(mut self, index: usize) -> Self {
        self.measure_index = Some(index);
        self
    }
}

/// A node in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedNode {
    pub value: String,
    pub node_type: NodeType,
    pub measure_index: Option<usize>,
    pub level: usize,
    /// First leaf covered by this node
    pub index: usize,
    /// Number of leaves covered
    pub size: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

impl IndexedNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn spans(&self, leaf: usize) -> bool {
        leaf >= self.index && leaf < self.index + self.size
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PivotTree {
    nodes: Vec<IndexedNode>,
    roots: Vec<usize>,
    leaves: Vec<usize>,
    /// Node ids per level, in leaf order
    levels: Vec<Vec<usize>>,
}

impl PivotTree {
    pub fn build(roots: &[PivotNode]) -> Self {
        let mut tree = PivotTree::default();
        for root in roots {
            let id = tree.insert(root, 0, None);
            tree.roots.push(id);
        }
        tree
    }

    fn insert(&mut self, node: &PivotNode, level: usize, parent: Option<usize>) -> usize {
        let id = self.nodes.len();
        self.nodes.push(IndexedNode {
            value: node.value.clone(),
            node_type: node.node_type,
            measure_index: node.measure_index,
            level,
            index: self.leaves.len(),
            size: 0,
            parent,
            children: Vec::new(),
        });
        if self.levels.len() <= level {
            self.levels.resize_with(level + 1, Vec::new);
        }
        self.levels[level].push(id);

        if node.children.is_empty() {
            self.leaves.push(id);
            self.nodes[id].size = 1;
        } else {
            let mut children = Vec::with_capacity(node.children.len());
            for child in &node.children {
                children.push(self.insert(child, level + 1, Some(id)));
            }
            let size: usize = children.iter().map(|c| self.nodes[*c].size).sum();
            let node = &mut self.nodes[id];
            node.children = children;
            node.size = size;
        }
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Number of header levels.
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn node(&self, id: usize) -> Option<&IndexedNode> {
        self.nodes.get(id)
    }

    pub fn roots(&self) -> impl Iterator<Item = &IndexedNode> {
        self.roots.iter().map(|id| &self.nodes[*id])
    }

    pub fn leaf(&self, leaf: usize) -> Option<&IndexedNode> {
        self.leaves.get(leaf).map(|id| &self.nodes[*id])
    }

    /// Nodes from the root down to leaf `leaf`.
    pub fn leaf_path(&self, leaf: usize) -> Vec<&IndexedNode> {
        let mut path = Vec::new();
        let mut current = self.leaves.get(leaf).copied();
        while let Some(id) = current {
            let node = &self.nodes[id];
            path.push(node);
            current = node.parent;
        }
        path.reverse();
        path
    }

    /// The header cell at `level` spanning leaf `leaf`.
    pub fn node_at(&self, level: usize, leaf: usize) -> Option<&IndexedNode> {
        let ids = self.levels.get(level)?;
        let pos = ids.partition_point(|id| self.nodes[*id].index <= leaf);
        let node = &self.nodes[*ids.get(pos.checked_sub(1)?)?];
        node.spans(leaf).then_some(node)
    }
}
