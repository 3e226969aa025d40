use serde::{Deserialize, Serialize};

use crate::shared::features::FeatureFrame;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Rows with `value <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub num_leaves: usize,
    pub min_child_samples: usize,
    pub min_child_weight: f64,
    pub reg_lambda: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
    left_grad: f64,
    left_hess: f64,
    left_count: usize,
}

#[derive(Debug, Clone, Copy)]
struct LeafStats {
    node: usize,
    grad: f64,
    hess: f64,
    count: usize,
    best: Option<SplitCandidate>,
}

/// Row indices of every feature column, sorted by value
pub fn presort(features: &FeatureFrame) -> Vec<Vec<usize>> {
    (0..features.width())
        .map(|col| {
            let column = features.column_at(col);
            let mut order: Vec<usize> = (0..features.height()).collect();
            order.sort_by(|&a, &b| column[a].total_cmp(&column[b]));
            order
        })
        .collect()
}

struct Grower<'a> {
    features: &'a FeatureFrame,
    sorted: &'a [Vec<usize>],
    grad: &'a [f64],
    hess: &'a [f64],
    params: TreeParams,
    leaf_of: Vec<usize>,
}

impl Grower<'_> {
    fn score(&self, grad: f64, hess: f64) -> f64 {
        grad * grad / (hess + self.params.reg_lambda)
    }

    fn best_split(&self, node: usize, grad: f64, hess: f64, count: usize) -> Option<SplitCandidate> {
        let min_samples = self.params.min_child_samples.max(1);
        if count < 2 * min_samples {
            return None;
        }
        let parent = self.score(grad, hess);
        let mut best: Option<SplitCandidate> = None;

        for (feature, order) in self.sorted.iter().enumerate() {
            let column = self.features.column_at(feature);
            let (mut gl, mut hl, mut nl) = (0.0, 0.0, 0usize);
            let mut prev: Option<f64> = None;

            for &row in order {
                if self.leaf_of[row] != node {
                    continue;
                }
                let value = column[row];
                if let Some(p) = prev {
                    let hr = hess - hl;
                    if value > p
                        && nl >= min_samples
                        && count - nl >= min_samples
                        && hl >= self.params.min_child_weight
                        && hr >= self.params.min_child_weight
                    {
                        let gain = self.score(gl, hl) + self.score(grad - gl, hr) - parent;
                        if gain > best.map_or(1e-12, |b| b.gain) {
                            let mut threshold = p + (value - p) / 2.0;
                            if threshold >= value {
                                threshold = p;
                            }
                            best = Some(SplitCandidate {
                                feature,
                                threshold,
                                gain,
                                left_grad: gl,
                                left_hess: hl,
                                left_count: nl,
                            });
                        }
                    }
                }
                gl += self.grad[row];
                hl += self.hess[row];
                nl += 1;
                prev = Some(value);
            }
        }
        best
    }

    fn leaf(&self, node: usize, grad: f64, hess: f64, count: usize) -> LeafStats {
        LeafStats {
            node,
            grad,
            hess,
            count,
            best: self.best_split(node, grad, hess, count),
        }
    }
}

impl RegressionTree {
    /// Grows a tree leaf-wise: the leaf with the largest gain is split next,
    /// until `num_leaves` is reached or no split improves the loss.
    /// Leaf outputs are Newton steps scaled by `shrinkage`.
    pub fn fit(
        features: &FeatureFrame,
        sorted: &[Vec<usize>],
        grad: &[f64],
        hess: &[f64],
        params: TreeParams,
        shrinkage: f64,
    ) -> RegressionTree {
        let mut grower = Grower {
            features,
            sorted,
            grad,
            hess,
            params,
            leaf_of: vec![0; features.height()],
        };

        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let root = grower.leaf(0, grad.iter().sum(), hess.iter().sum(), features.height());
        let mut leaves = vec![root];

        while leaves.len() < params.num_leaves.max(1) {
            let pick = leaves
                .iter()
                .enumerate()
                .filter_map(|(idx, leaf)| leaf.best.map(|b| (idx, b.gain)))
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(idx, _)| idx);
            let Some(idx) = pick else {
                break;
            };
            let parent = leaves.swap_remove(idx);
            let Some(split) = parent.best else {
                break;
            };

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf { value: 0.0 });
            nodes.push(Node::Leaf { value: 0.0 });
            nodes[parent.node] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };

            let column = features.column_at(split.feature);
            for (row, owner) in grower.leaf_of.iter_mut().enumerate() {
                if *owner == parent.node {
                    *owner = if column[row] <= split.threshold { left } else { right };
                }
            }

            leaves.push(grower.leaf(left, split.left_grad, split.left_hess, split.left_count));
            leaves.push(grower.leaf(
                right,
                parent.grad - split.left_grad,
                parent.hess - split.left_hess,
                parent.count - split.left_count,
            ));
        }

        for leaf in &leaves {
            let denom = leaf.hess + params.reg_lambda;
            let value = if denom > 0.0 { -leaf.grad / denom * shrinkage } else { 0.0 };
            nodes[leaf.node] = Node::Leaf { value };
        }

        RegressionTree { nodes }
    }

    pub fn predict_at(&self, features: &FeatureFrame, row: usize) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf { value } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features.value(row, feature) <= threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    #[cfg(test)]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }

    /// Largest feature index referenced by a split
    pub fn max_feature(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                Node::Split { feature, .. } => Some(*feature),
                Node::Leaf { .. } => None,
            })
            .max()
    }
}
