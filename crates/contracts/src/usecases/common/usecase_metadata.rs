/// Метаданные UseCase для идентификации в логах и ответах API
pub trait UseCaseMetadata {
    /// Индекс UseCase (например, "u601")
    fn usecase_index() -> &'static str;

    /// Техническое имя (например, "train_fraud_model")
    fn usecase_name() -> &'static str;

    /// Отображаемое имя для UI
    fn display_name() -> &'static str;

    fn description() -> &'static str {
        ""
    }

    /// Полное имя вида "u601_train_fraud_model"
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::u601_train_fraud_model::TrainFraudModel;
    use crate::usecases::u602_predict_fraud::PredictFraud;

    #[test]
    fn full_name_joins_index_and_name() {
        assert_eq!(TrainFraudModel::full_name(), "u601_train_fraud_model");
        assert_eq!(PredictFraud::full_name(), "u602_predict_fraud");
    }
}
