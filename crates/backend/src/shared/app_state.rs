use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::dashboards::d400_orders_summary::repository::{load_orders, OrdersDataset};
use crate::shared::config::{resolve_path, Config};
use crate::shared::data::ttl_cache::TtlCache;
use crate::shared::frame::FrameError;
use crate::usecases::u602_predict_fraud::PredictExecutor;

/// Состояние HTTP-сервера, передается в handlers через `State<Arc<AppState>>`
pub struct AppState {
    pub config: Config,
    /// Каталог, относительно которого ищутся данные и артефакты
    pub base_dir: PathBuf,
    orders: TtlCache<OrdersDataset>,
}

impl AppState {
    pub fn new(config: Config, base_dir: PathBuf) -> Self {
        let ttl = Duration::from_secs(config.data.cache_ttl_secs);
        Self {
            config,
            base_dir,
            orders: TtlCache::new(ttl),
        }
    }

    pub fn dashboard_path(&self) -> PathBuf {
        resolve_path(&self.base_dir, &self.config.data.dashboard_path)
    }

    /// Датасет дашборда, перечитывается не чаще раза в TTL
    pub fn orders(&self) -> Result<Arc<OrdersDataset>, FrameError> {
        let path = self.dashboard_path();
        self.orders.get_or_load(|| load_orders(&path))
    }

    pub fn refresh_orders(&self) {
        tracing::info!("D400 Dashboard: dataset cache invalidated");
        self.orders.invalidate();
    }

    /// Model and encoder are read from disk on every run
    pub fn predictor(&self) -> PredictExecutor {
        PredictExecutor::from_config(&self.config, &self.base_dir)
    }
}
