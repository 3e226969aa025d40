//! Gradient-boosted decision trees for binary classification.
//!
//! - [`tree`]: leaf-wise regression tree grown on gradients/hessians
//! - [`booster`]: log-loss boosting with balanced class weights and
//!   early stopping on validation AUC
//! - [`metrics`]: ROC-AUC, average precision, confusion matrix

pub mod booster;
pub mod metrics;
pub mod tree;

pub use booster::{BoostingParams, GradientBoostedModel};

use crate::shared::features::{FeatureFrame, PipelineError};

/// What the predictor needs from a fitted model
pub trait FraudClassifier {
    /// Ordered feature names the model was trained on
    fn feature_names(&self) -> &[String];

    /// Probability of class 1 for every row of `features`
    fn predict_proba(&self, features: &FeatureFrame) -> Result<Vec<f64>, PipelineError>;
}

#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
