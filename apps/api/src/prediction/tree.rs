//! Decision procedure over the loaded tree ensemble.
//!
//! Traversal follows the layout the artifact was trained with: an internal
//! node sends `x[feature] <= threshold` to `left_child` and everything else
//! to `right_child`; `left_child == LEAF` marks a leaf. A leaf's value row
//! holds per-class sample counts and normalizes to that tree's probability
//! vector; the ensemble averages the vectors across trees.

use serde::Deserialize;

/// Sentinel child index marking a leaf node.
pub const LEAF: i64 = -1;

/// A single node record in the current (v2) schema.
/// Field set must stay in sync with `NODE_SCHEMA` in `artifact.rs`.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeRecord {
    pub left_child: i64,
    pub right_child: i64,
    pub feature: i64,
    pub threshold: f64,
    #[allow(dead_code)]
    pub impurity: f64,
    #[allow(dead_code)]
    pub n_node_samples: i64,
    #[allow(dead_code)]
    pub weighted_n_node_samples: f64,
    #[allow(dead_code)]
    pub missing_go_to_left: u8,
}

/// One decision tree: a node array plus a per-node value row
/// (per-class sample counts, meaningful at leaves).
#[derive(Debug, Clone)]
pub struct Tree {
    pub nodes: Vec<NodeRecord>,
    pub values: Vec<Vec<f64>>,
}

impl Tree {
    /// Walks the tree from the root and returns the index of the leaf the
    /// feature vector lands in.
    fn leaf_for(&self, features: &[f64]) -> usize {
        let mut idx = 0_usize;
        loop {
            let node = &self.nodes[idx];
            if node.left_child == LEAF {
                return idx;
            }
            idx = if features[node.feature as usize] <= node.threshold {
                node.left_child as usize
            } else {
                node.right_child as usize
            };
        }
    }

    /// Per-class probability vector for one feature vector: the landing
    /// leaf's value row, normalized.
    pub fn probabilities(&self, features: &[f64]) -> Vec<f64> {
        let row = &self.values[self.leaf_for(features)];
        let total: f64 = row.iter().sum();
        if total > 0.0 {
            row.iter().map(|v| v / total).collect()
        } else {
            vec![0.0; row.len()]
        }
    }
}

/// Averages per-tree probability vectors into the ensemble vector.
pub fn ensemble_probabilities(trees: &[Tree], features: &[f64], n_classes: usize) -> Vec<f64> {
    let mut averaged = vec![0.0_f64; n_classes];
    for tree in trees {
        for (slot, p) in averaged.iter_mut().zip(tree.probabilities(features)) {
            *slot += p;
        }
    }
    let n = trees.len() as f64;
    for slot in &mut averaged {
        *slot /= n;
    }
    averaged
}

/// Index of the most probable class, breaking ties toward the lower index.
pub fn argmax(probabilities: &[f64]) -> usize {
    let mut best = 0;
    for (i, p) in probabilities.iter().enumerate().skip(1) {
        if *p > probabilities[best] {
            best = i;
        }
    }
    best
}
