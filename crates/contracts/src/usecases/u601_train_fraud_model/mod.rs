pub mod report;

pub use report::{ClassificationMetrics, ConfusionMatrix, SplitSizes, TrainingReport};

use crate::usecases::common::UseCaseMetadata;

pub struct TrainFraudModel;

impl UseCaseMetadata for TrainFraudModel {
    fn usecase_index() -> &'static str {
        "u601"
    }

    fn usecase_name() -> &'static str {
        "train_fraud_model"
    }

    fn display_name() -> &'static str {
        "Обучение модели фейковых заказов"
    }

    fn description() -> &'static str {
        "Обучение градиентного бустинга на размеченной истории заказов"
    }
}
