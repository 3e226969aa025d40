pub mod request;
pub mod response;

pub use request::UploadedSheet;
pub use response::{ColumnMismatch, PredictionFailure, PredictionResponse, RowPrediction};

use crate::usecases::common::UseCaseMetadata;

pub struct PredictFraud;

impl UseCaseMetadata for PredictFraud {
    fn usecase_index() -> &'static str {
        "u602"
    }

    fn usecase_name() -> &'static str {
        "predict_fraud"
    }

    fn display_name() -> &'static str {
        "Предсказание фейковых заказов"
    }

    fn description() -> &'static str {
        "Скоринг загруженного файла заказов обученной моделью"
    }
}
