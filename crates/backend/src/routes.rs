use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::api::handlers;
use crate::shared::app_state::AppState;

/// Максимальный размер загружаемого файла
const UPLOAD_LIMIT_BYTES: usize = 32 * 1024 * 1024;

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // DASHBOARDS
        // ========================================
        // D400 Orders Summary Dashboard
        .route(
            "/api/d400/orders-summary",
            get(handlers::d400_orders_summary::get_orders_summary),
        )
        .route(
            "/api/d400/orders-summary/refresh",
            post(handlers::d400_orders_summary::refresh_orders),
        )
        // ========================================
        // USECASES
        // ========================================
        // UseCase u602: Predict fraud
        .route(
            "/api/u602/predict",
            post(handlers::u602_predict_fraud::predict_upload),
        )
        .route(
            "/api/u602/predict-json",
            post(handlers::u602_predict_fraud::predict_sheet),
        )
        .route(
            "/api/u602/predict/export",
            post(handlers::u602_predict_fraud::export_predictions),
        )
        .layer(DefaultBodyLimit::max(UPLOAD_LIMIT_BYTES))
        .with_state(state)
}
