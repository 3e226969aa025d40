use serde::{Deserialize, Serialize};

use crate::usecases::common::UseCaseError;

/// Результат скоринга загруженного файла
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Уникальный ID запуска (для поиска в логах)
    pub run_id: String,
    pub file_name: String,
    pub row_count: usize,
    /// Сколько строк помечено как фейковые
    pub flagged_count: usize,
    pub threshold: f64,
    pub predictions: Vec<RowPrediction>,
    /// Имя файла для скачивания
    pub export_file_name: String,
    /// Исходный файл + колонка предсказания, CSV
    pub export_csv: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RowPrediction {
    pub row_index: usize,
    pub probability: f64,
    pub prediction: u8,
}

/// Расхождение набора колонок загрузки с ожидаемым
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnMismatch {
    pub expected: Vec<String>,
    pub found: Vec<String>,
}

/// Тело ответа при ошибке валидации или пайплайна
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionFailure {
    pub error: UseCaseError,
    pub column_mismatch: Option<ColumnMismatch>,
}
