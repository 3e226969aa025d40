use chrono::Utc;
use contracts::shared::order_schema::{
    canonical_name, find_target_column, normalize_column_name, TARGET_COLUMN, TARGET_SYNONYMS,
    TRAINING_DATASET_CANDIDATES,
};
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u601_train_fraud_model::{SplitSizes, TrainFraudModel, TrainingReport};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::split::stratified_split;
use super::target::{class_balance, coerce_labels, LabelError};
use crate::shared::config::{resolve_path, Config};
use crate::shared::data::artifact_store::{self, ArtifactError};
use crate::shared::features::{derive_time_features, prepare_features, EncoderMode, PipelineError};
use crate::shared::frame::{column_names, rename, rename_with, FrameError, RawTable};
use crate::shared::gbdt::metrics::classification_metrics;
use crate::shared::gbdt::{BoostingParams, FraudClassifier, GradientBoostedModel};

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("no training dataset found in '{dir}' (looked for: {})", TRAINING_DATASET_CANDIDATES.join(", "))]
    NoDataset { dir: String },

    #[error("target column not found, accepted names: {}", TARGET_SYNONYMS.join(", "))]
    NoTargetColumn,

    #[error("target column '{column}', data row {row}: '{value}' is not a 0/1 label")]
    InvalidTarget {
        column: String,
        row: usize,
        value: String,
    },

    #[error("cannot split dataset: {0}")]
    DegenerateSplit(String),

    #[error("failed to read dataset: {0}")]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Paths and parameters of one training run
#[derive(Debug, Clone)]
pub struct TrainSettings {
    /// Directory searched for the training dataset
    pub base_dir: PathBuf,
    pub model_path: PathBuf,
    pub encoder_path: PathBuf,
    pub report_path: PathBuf,
    pub threshold: f64,
    pub seed: u64,
    pub boosting: BoostingParams,
}

impl TrainSettings {
    pub fn from_config(config: &Config, base_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            model_path: resolve_path(base_dir, &config.model.model_path),
            encoder_path: resolve_path(base_dir, &config.model.encoder_path),
            report_path: resolve_path(base_dir, &config.model.report_path),
            threshold: config.model.threshold,
            seed: config.training.seed,
            boosting: config.training.boosting.clone(),
        }
    }
}

/// First existing candidate file in `dir`
pub fn locate_dataset(dir: &Path) -> Result<PathBuf, TrainError> {
    TRAINING_DATASET_CANDIDATES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| TrainError::NoDataset {
            dir: dir.display().to_string(),
        })
}

/// Dataset after column cleanup: features still typed, labels split off
struct LabeledFrame {
    frame: DataFrame,
    labels: Vec<u8>,
    source_target: String,
}

fn prepare_labeled_frame(raw: &RawTable) -> Result<LabeledFrame, TrainError> {
    let frame = rename_with(&raw.typed()?, normalize_column_name)?;
    let frame = rename_with(&frame, |name| canonical_name(name).unwrap_or(name).to_string())?;

    let names = column_names(&frame);
    let source_target =
        find_target_column(names.iter().map(String::as_str)).ok_or(TrainError::NoTargetColumn)?;
    let mut frame = rename(&frame, &source_target, TARGET_COLUMN)?;
    tracing::info!("Target column: '{}'", source_target);

    if let Some(date_col) = derive_time_features(&mut frame)? {
        tracing::info!("Time features derived from '{}'", date_col);
    } else {
        tracing::warn!("No creation date column, time features skipped");
    }

    let target = frame
        .drop_in_place(TARGET_COLUMN)
        .map_err(FrameError::from)?;
    let labels = coerce_labels(&target).map_err(|e| match e {
        LabelError::Invalid { row, value } => TrainError::InvalidTarget {
            column: source_target.clone(),
            row,
            value,
        },
        LabelError::Frame(e) => TrainError::Frame(e),
    })?;

    Ok(LabeledFrame {
        frame,
        labels,
        source_target,
    })
}

/// Executor для UseCase обучения модели фрода
pub struct TrainExecutor {
    settings: TrainSettings,
}

impl TrainExecutor {
    pub fn new(settings: TrainSettings) -> Self {
        Self { settings }
    }

    /// Найти датасет, обучить модель и сохранить артефакты
    pub fn execute(&self) -> Result<TrainingReport, TrainError> {
        let dataset = locate_dataset(&self.settings.base_dir)?;
        tracing::info!(
            "{}: loading training dataset {}",
            TrainFraudModel::full_name(),
            dataset.display()
        );
        let raw = RawTable::from_path(&dataset)?;
        self.train_from_table(&raw, &dataset)
    }

    pub fn train_from_table(&self, raw: &RawTable, dataset: &Path) -> Result<TrainingReport, TrainError> {
        let settings = &self.settings;
        let labeled = prepare_labeled_frame(raw)?;
        tracing::info!(
            "{} rows, {} feature columns, {}",
            labeled.labels.len(),
            labeled.frame.width(),
            class_balance(&labeled.labels)
        );

        let prepared = prepare_features(&labeled.frame, EncoderMode::Fit)?;
        let features = prepared.features;
        if features.width() == 0 {
            tracing::warn!("Dataset has no feature columns, the model will predict a constant");
        }

        let split =
            stratified_split(&labeled.labels, settings.seed).map_err(TrainError::DegenerateSplit)?;
        let pick = |idx: &[usize]| -> Vec<u8> { idx.iter().map(|&i| labeled.labels[i]).collect() };
        let (x_train, y_train) = (features.take_rows(&split.train), pick(&split.train));
        let (x_valid, y_valid) = (features.take_rows(&split.validation), pick(&split.validation));
        let (x_test, y_test) = (features.take_rows(&split.test), pick(&split.test));
        tracing::info!(
            "Split: train {}, validation {}, test {}",
            y_train.len(),
            y_valid.len(),
            y_test.len()
        );

        let model = GradientBoostedModel::fit(&x_train, &y_train, &x_valid, &y_valid, &settings.boosting)?;
        tracing::info!(
            "Best iteration {}, validation AUC {:?}",
            model.best_iteration(),
            model.best_validation_auc()
        );

        let test_proba = model.predict_proba(&x_test)?;
        let test_metrics = classification_metrics(&test_proba, &y_test, settings.threshold);
        tracing::info!(
            "Test: AUC {:?}, AP {:?}, precision {:.3}, recall {:.3}, F1 {:.3}",
            test_metrics.roc_auc,
            test_metrics.average_precision,
            test_metrics.precision,
            test_metrics.recall,
            test_metrics.f1
        );
        tracing::info!("Confusion matrix:\n{}", test_metrics.confusion);

        artifact_store::save_json(&settings.model_path, &model)?;
        let encoder_saved = match &prepared.fitted_encoder {
            Some(encoder) => {
                artifact_store::save_json(&settings.encoder_path, encoder)?;
                true
            }
            None => {
                if artifact_store::remove_stale(&settings.encoder_path)? {
                    tracing::info!(
                        "Removed stale encoder {}",
                        settings.encoder_path.display()
                    );
                }
                false
            }
        };

        let report = TrainingReport {
            dataset_path: dataset.display().to_string(),
            source_target_column: labeled.source_target,
            row_count: labeled.labels.len(),
            feature_names: features.names().to_vec(),
            split: SplitSizes {
                train: y_train.len(),
                validation: y_valid.len(),
                test: y_test.len(),
            },
            best_iteration: model.best_iteration(),
            validation_auc: model.best_validation_auc(),
            test_metrics,
            encoder_saved,
            trained_at: Utc::now(),
        };
        artifact_store::save_json(&settings.report_path, &report)?;
        tracing::info!("Model saved to {}", settings.model_path.display());

        Ok(report)
    }
}
