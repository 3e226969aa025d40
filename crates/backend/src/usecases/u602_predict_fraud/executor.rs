use contracts::shared::order_schema::{canonical_name, EXPECTED_UPLOAD_COLUMNS, PREDICTION_COLUMN};
use contracts::usecases::common::{UseCaseError, UseCaseMetadata};
use contracts::usecases::u602_predict_fraud::{
    ColumnMismatch, PredictFraud, PredictionFailure, PredictionResponse, RowPrediction,
};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::shared::config::{resolve_path, Config};
use crate::shared::data::artifact_store;
use crate::shared::features::{
    align_to_features, derive_time_features, prepare_features, EncoderMode, OrdinalEncoder,
};
use crate::shared::frame::{rename_with, RawTable};
use crate::shared::gbdt::FraudClassifier;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("uploaded columns do not match, expected {expected:?}, found {found:?}")]
    Validation {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("prediction failed: {0}")]
    Pipeline(String),
}

impl PredictError {
    fn pipeline(e: impl std::fmt::Display) -> Self {
        PredictError::Pipeline(e.to_string())
    }

    /// Тело ответа для клиента
    pub fn to_failure(&self) -> PredictionFailure {
        match self {
            PredictError::Validation { expected, found } => PredictionFailure {
                error: UseCaseError::validation(self.to_string()),
                column_mismatch: Some(ColumnMismatch {
                    expected: expected.clone(),
                    found: found.clone(),
                }),
            },
            PredictError::Pipeline(cause) => PredictionFailure {
                error: UseCaseError::pipeline("prediction failed").with_details(cause.clone()),
                column_mismatch: None,
            },
        }
    }
}

/// Набор колонок должен совпасть с ожидаемым (порядок не важен)
pub fn validate_columns(headers: &[String]) -> Result<(), PredictError> {
    let expected: BTreeSet<&str> = EXPECTED_UPLOAD_COLUMNS.iter().copied().collect();
    let found: BTreeSet<&str> = headers.iter().map(String::as_str).collect();
    if expected == found && found.len() == headers.len() {
        return Ok(());
    }
    Err(PredictError::Validation {
        expected: EXPECTED_UPLOAD_COLUMNS.iter().map(|s| s.to_string()).collect(),
        found: headers.to_vec(),
    })
}

/// Scored upload: per-row output plus the augmented table
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub probabilities: Vec<f64>,
    pub predictions: Vec<u8>,
    /// Original upload with the prediction column appended
    pub augmented: RawTable,
}

impl PredictionOutcome {
    pub fn flagged_count(&self) -> usize {
        self.predictions.iter().filter(|&&p| p == 1).count()
    }
}

/// Scores an upload with an already loaded model and encoder.
///
/// The table is validated, renamed to internal names, passed through the
/// same feature pipeline as training and aligned to the model's features.
/// The prediction column is appended to the untouched original table.
pub fn predict(
    table: &RawTable,
    model: &dyn FraudClassifier,
    encoder: Option<&OrdinalEncoder>,
    threshold: f64,
) -> Result<PredictionOutcome, PredictError> {
    validate_columns(&table.headers())?;

    let typed = table.typed().map_err(PredictError::pipeline)?;
    let mut frame = rename_with(&typed, |name| canonical_name(name).unwrap_or(name).to_string())
        .map_err(PredictError::pipeline)?;
    derive_time_features(&mut frame).map_err(PredictError::pipeline)?;

    let prepared =
        prepare_features(&frame, EncoderMode::Apply(encoder)).map_err(PredictError::pipeline)?;
    let aligned = align_to_features(&prepared.features, model.feature_names());
    let probabilities = model
        .predict_proba(&aligned)
        .map_err(PredictError::pipeline)?;

    let predictions: Vec<u8> = probabilities
        .iter()
        .map(|&p| u8::from(p >= threshold))
        .collect();
    let augmented = table
        .clone()
        .with_column(
            PREDICTION_COLUMN,
            predictions.iter().map(|p| p.to_string()).collect(),
        )
        .map_err(PredictError::pipeline)?;

    Ok(PredictionOutcome {
        probabilities,
        predictions,
        augmented,
    })
}

/// Executor для UseCase предсказания: артефакты читаются с диска на каждый запуск
pub struct PredictExecutor {
    model_path: PathBuf,
    encoder_path: PathBuf,
    threshold: f64,
}

impl PredictExecutor {
    pub fn new(model_path: PathBuf, encoder_path: PathBuf, threshold: f64) -> Self {
        Self {
            model_path,
            encoder_path,
            threshold,
        }
    }

    pub fn from_config(config: &Config, base_dir: &Path) -> Self {
        Self::new(
            resolve_path(base_dir, &config.model.model_path),
            resolve_path(base_dir, &config.model.encoder_path),
            config.model.threshold,
        )
    }

    pub fn execute(&self, table: &RawTable, file_name: &str) -> Result<PredictionResponse, PredictError> {
        let run_id = Uuid::new_v4().to_string();
        tracing::info!(
            "{} [{}] scoring '{}': {} rows",
            PredictFraud::full_name(),
            run_id,
            file_name,
            table.row_count()
        );

        // columns are checked before touching the artifacts
        validate_columns(&table.headers())?;
        let model = artifact_store::load_model(&self.model_path).map_err(PredictError::pipeline)?;
        let encoder =
            artifact_store::load_encoder(&self.encoder_path).map_err(PredictError::pipeline)?;
        if encoder.is_none() {
            tracing::debug!("[{}] No encoder artifact, numeric features only", run_id);
        }

        let outcome = predict(table, &model, encoder.as_ref(), self.threshold)?;
        let export_csv = outcome
            .augmented
            .to_csv()
            .map_err(PredictError::pipeline)?;

        tracing::info!(
            "[{}] {} of {} rows flagged as fake",
            run_id,
            outcome.flagged_count(),
            outcome.predictions.len()
        );

        Ok(PredictionResponse {
            run_id,
            file_name: file_name.to_string(),
            row_count: outcome.predictions.len(),
            flagged_count: outcome.flagged_count(),
            threshold: self.threshold,
            predictions: outcome
                .probabilities
                .iter()
                .zip(&outcome.predictions)
                .enumerate()
                .map(|(row_index, (&probability, &prediction))| RowPrediction {
                    row_index,
                    probability,
                    prediction,
                })
                .collect(),
            export_file_name: export_file_name(file_name),
            export_csv,
        })
    }
}

/// "orders.csv" -> "orders_predictions.csv"
pub fn export_file_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("upload");
    format!("{}_predictions.csv", stem)
}
