use serde::{Deserialize, Serialize};

use super::metrics::roc_auc;
use super::tree::{presort, RegressionTree, TreeParams};
use super::{sigmoid, FraudClassifier};
use crate::shared::features::{FeatureFrame, PipelineError};

/// Boosting hyper-parameters; defaults follow the production training run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub num_leaves: usize,
    pub min_child_samples: usize,
    pub min_child_weight: f64,
    pub reg_lambda: f64,
    /// Stop after this many rounds without a better validation AUC
    pub early_stopping_rounds: usize,
    /// Weight each class by n / (2 * n_class)
    pub balanced_class_weight: bool,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 1000,
            learning_rate: 0.05,
            num_leaves: 31,
            min_child_samples: 20,
            min_child_weight: 1e-3,
            reg_lambda: 0.0,
            early_stopping_rounds: 50,
            balanced_class_weight: true,
        }
    }
}

/// Fitted binary classifier, persisted as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostedModel {
    feature_names: Vec<String>,
    /// Initial log-odds
    base_score: f64,
    trees: Vec<RegressionTree>,
    best_iteration: usize,
    best_validation_auc: Option<f64>,
}

fn class_weights(labels: &[u8], balanced: bool) -> Result<[f64; 2], PipelineError> {
    let positives = labels.iter().filter(|&&y| y == 1).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(PipelineError::Model(
            "training labels contain a single class".to_string(),
        ));
    }
    if !balanced {
        return Ok([1.0, 1.0]);
    }
    let n = labels.len() as f64;
    Ok([n / (2.0 * negatives as f64), n / (2.0 * positives as f64)])
}

impl GradientBoostedModel {
    pub fn fit(
        train: &FeatureFrame,
        y_train: &[u8],
        valid: &FeatureFrame,
        y_valid: &[u8],
        params: &BoostingParams,
    ) -> Result<Self, PipelineError> {
        if train.height() != y_train.len() || valid.height() != y_valid.len() {
            return Err(PipelineError::Model(
                "feature rows and labels differ in length".to_string(),
            ));
        }
        if train.names() != valid.names() {
            return Err(PipelineError::Model(
                "train and validation features differ".to_string(),
            ));
        }

        let weights = class_weights(y_train, params.balanced_class_weight)?;
        let row_weight = |y: u8| weights[usize::from(y == 1)];

        let weight_sum: f64 = y_train.iter().map(|&y| row_weight(y)).sum();
        let positive_weight: f64 = y_train
            .iter()
            .filter(|&&y| y == 1)
            .map(|&y| row_weight(y))
            .sum();
        let mean = (positive_weight / weight_sum).clamp(1e-15, 1.0 - 1e-15);
        let base_score = (mean / (1.0 - mean)).ln();

        let tree_params = TreeParams {
            num_leaves: params.num_leaves,
            min_child_samples: params.min_child_samples,
            min_child_weight: params.min_child_weight,
            reg_lambda: params.reg_lambda,
        };
        let sorted = presort(train);

        let mut train_raw = vec![base_score; train.height()];
        let mut valid_raw = vec![base_score; valid.height()];
        let mut grad = vec![0.0; train.height()];
        let mut hess = vec![0.0; train.height()];

        let mut trees = Vec::new();
        let mut best_auc: Option<f64> = None;
        let mut best_iteration = 0;
        let mut rounds_without_gain = 0;

        for iteration in 1..=params.n_estimators {
            for (row, &y) in y_train.iter().enumerate() {
                let p = sigmoid(train_raw[row]);
                let w = row_weight(y);
                grad[row] = w * (p - f64::from(y));
                hess[row] = (w * p * (1.0 - p)).max(1e-16);
            }

            let tree = RegressionTree::fit(
                train,
                &sorted,
                &grad,
                &hess,
                tree_params,
                params.learning_rate,
            );
            for (row, raw) in train_raw.iter_mut().enumerate() {
                *raw += tree.predict_at(train, row);
            }
            for (row, raw) in valid_raw.iter_mut().enumerate() {
                *raw += tree.predict_at(valid, row);
            }
            trees.push(tree);

            // AUC is rank-based, raw scores rank like probabilities
            if let Some(auc) = roc_auc(&valid_raw, y_valid) {
                if best_auc.map_or(true, |best| auc > best) {
                    best_auc = Some(auc);
                    best_iteration = iteration;
                    rounds_without_gain = 0;
                } else {
                    rounds_without_gain += 1;
                }
            }

            if iteration % 100 == 0 {
                tracing::info!(
                    "Boosting round {}: best validation AUC {:?} at round {}",
                    iteration,
                    best_auc,
                    best_iteration
                );
            }

            if params.early_stopping_rounds > 0 && rounds_without_gain >= params.early_stopping_rounds {
                tracing::info!(
                    "Early stopping at round {} (no AUC gain for {} rounds), best round {}",
                    iteration,
                    params.early_stopping_rounds,
                    best_iteration
                );
                break;
            }
        }

        if best_auc.is_none() {
            tracing::warn!("Validation set has a single class, early stopping disabled");
            best_iteration = trees.len();
        }
        trees.truncate(best_iteration);

        Ok(Self {
            feature_names: train.names().to_vec(),
            base_score,
            trees,
            best_iteration,
            best_validation_auc: best_auc,
        })
    }

    pub fn best_iteration(&self) -> usize {
        self.best_iteration
    }

    pub fn best_validation_auc(&self) -> Option<f64> {
        self.best_validation_auc
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }

    pub fn raw_score(&self, features: &FeatureFrame, row: usize) -> f64 {
        self.base_score
            + self
                .trees
                .iter()
                .map(|tree| tree.predict_at(features, row))
                .sum::<f64>()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Rejects artifacts whose trees reference features beyond the name list
    pub fn from_json(text: &str) -> Result<Self, PipelineError> {
        let model: GradientBoostedModel =
            serde_json::from_str(text).map_err(|e| PipelineError::Model(e.to_string()))?;
        let width = model.feature_names.len();
        if let Some(max) = model.trees.iter().filter_map(|t| t.max_feature()).max() {
            if max >= width {
                return Err(PipelineError::Model(format!(
                    "tree references feature #{} but model has {} features",
                    max, width
                )));
            }
        }
        Ok(model)
    }
}

impl FraudClassifier for GradientBoostedModel {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict_proba(&self, features: &FeatureFrame) -> Result<Vec<f64>, PipelineError> {
        if features.width() != self.feature_names.len() {
            return Err(PipelineError::FeatureCountMismatch {
                expected: self.feature_names.len(),
                actual: features.width(),
            });
        }
        Ok((0..features.height())
            .map(|row| sigmoid(self.raw_score(features, row)))
            .collect())
    }
}
