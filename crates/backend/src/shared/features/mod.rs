//! Feature engineering shared by the trainer (u601) and the predictor (u602).
//!
//! Pipeline order is fixed: time features -> missing values + ordinal
//! encoding -> (inference only) alignment to the model's feature list.

pub mod align;
pub mod encoding;
pub mod preprocess;
pub mod time_features;

pub use align::align_to_features;
pub use encoding::OrdinalEncoder;
pub use preprocess::{prepare_features, EncoderMode, PreparedFeatures};
pub use time_features::{derive_time_features, find_date_column};

use thiserror::Error;

use crate::shared::frame::FrameError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("categorical column '{0}' cannot be used without a fitted encoder")]
    UnencodedCategorical(String),

    #[error("categorical column '{0}' was not seen when the encoder was fitted")]
    UnknownCategoricalColumn(String),

    #[error("feature matrix has {actual} columns, model expects {expected}")]
    FeatureCountMismatch { expected: usize, actual: usize },

    #[error("model error: {0}")]
    Model(String),
}

/// Dense numeric feature matrix, stored column by column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureFrame {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
    height: usize,
}

impl FeatureFrame {
    pub fn new(names: Vec<String>, columns: Vec<Vec<f64>>, height: usize) -> Result<Self, FrameError> {
        if names.len() != columns.len() {
            return Err(FrameError::LengthMismatch {
                name: "<feature names>".to_string(),
                expected: columns.len(),
                actual: names.len(),
            });
        }
        for (name, column) in names.iter().zip(&columns) {
            if column.len() != height {
                return Err(FrameError::LengthMismatch {
                    name: name.clone(),
                    expected: height,
                    actual: column.len(),
                });
            }
        }
        Ok(Self {
            names,
            columns,
            height,
        })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.columns[idx].as_slice())
    }

    pub fn column_at(&self, idx: usize) -> &[f64] {
        &self.columns[idx]
    }

    #[inline]
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.columns[col][row]
    }

    #[cfg(test)]
    pub fn row(&self, row: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c[row]).collect()
    }

    pub fn take_rows(&self, indices: &[usize]) -> FeatureFrame {
        FeatureFrame {
            names: self.names.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| indices.iter().map(|&i| c[i]).collect())
                .collect(),
            height: indices.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_and_columns_agree() {
        let frame = FeatureFrame::new(
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 2.0, 3.0], vec![10.0, 20.0, 30.0]],
            3,
        )
        .unwrap();
        assert_eq!(frame.row(1), vec![2.0, 20.0]);
        assert_eq!(frame.column("b"), Some(&[10.0, 20.0, 30.0][..]));
        assert_eq!(frame.take_rows(&[2, 0]).row(0), vec![3.0, 30.0]);
    }

    #[test]
    fn ragged_columns_are_rejected() {
        let err = FeatureFrame::new(vec!["a".into()], vec![vec![1.0]], 2);
        assert!(err.is_err());
    }
}
