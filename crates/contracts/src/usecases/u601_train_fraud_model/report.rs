use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Отчет об обучении, сохраняется рядом с моделью
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub dataset_path: String,
    /// Имя целевой колонки в исходном файле (до переименования)
    pub source_target_column: String,
    pub row_count: usize,
    pub feature_names: Vec<String>,
    pub split: SplitSizes,
    pub best_iteration: usize,
    /// None, если на валидации только один класс
    pub validation_auc: Option<f64>,
    pub test_metrics: ClassificationMetrics,
    pub encoder_saved: bool,
    pub trained_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SplitSizes {
    pub train: usize,
    pub validation: usize,
    pub test: usize,
}

/// Метрики бинарной классификации для класса 1 (фейковый заказ)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassificationMetrics {
    pub roc_auc: Option<f64>,
    pub average_precision: Option<f64>,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub confusion: ConfusionMatrix,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }
}

impl std::fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[[{} {}] [{} {}]]",
            self.true_negative, self.false_positive, self.false_negative, self.true_positive
        )
    }
}
