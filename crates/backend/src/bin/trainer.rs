//! Офлайн-обучение модели фейковых заказов.
//!
//! Ищет датасет в текущем каталоге, обучает модель и сохраняет
//! `fraud_model.json`, `ordinal_encoder.json` и `training_report.json`.

use backend::shared::{config, logger};
use backend::usecases::u601_train_fraud_model::{TrainExecutor, TrainSettings};
use contracts::usecases::u601_train_fraud_model::TrainingReport;

fn run() -> anyhow::Result<TrainingReport> {
    let config = config::load_config()?;
    let base_dir = std::env::current_dir()?;
    let executor = TrainExecutor::new(TrainSettings::from_config(&config, &base_dir));
    Ok(executor.execute()?)
}

fn main() {
    if let Err(e) = logger::init("trainer") {
        eprintln!("Logger init failed: {e}");
    }

    match run() {
        Ok(report) => {
            println!(
                "Model trained on {} rows: best iteration {}, test ROC-AUC {}, F1 {:.3}",
                report.row_count,
                report.best_iteration,
                report
                    .test_metrics
                    .roc_auc
                    .map_or_else(|| "n/a".to_string(), |auc| format!("{auc:.4}")),
                report.test_metrics.f1
            );
            println!("{}", report.test_metrics.confusion);
        }
        Err(e) => {
            tracing::error!("Training failed: {e:#}");
            eprintln!("Training failed: {e:#}");
            std::process::exit(1);
        }
    }
}
