use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use contracts::dashboards::d400_orders_summary::{OrdersSummaryRequest, OrdersSummaryResponse};
use std::sync::Arc;

use crate::dashboards::d400_orders_summary::service;
use crate::shared::app_state::AppState;

/// GET /api/d400/orders-summary?date_from=2024-05-01&date_to=2024-05-31
pub async fn get_orders_summary(
    State(state): State<Arc<AppState>>,
    Query(request): Query<OrdersSummaryRequest>,
) -> Result<Json<OrdersSummaryResponse>, StatusCode> {
    tracing::info!(
        "D400 Dashboard: orders summary for {:?}..{:?}",
        request.date_from,
        request.date_to
    );

    // the first request after a refresh reads the sheet from disk
    let loader = Arc::clone(&state);
    match tokio::task::spawn_blocking(move || loader.orders()).await {
        Ok(Ok(dataset)) => {
            let response = service::get_orders_summary(&dataset, &request);
            tracing::info!(
                "D400 Dashboard: {} orders, {} breakdowns, {} info messages",
                response.kpis.total,
                response.breakdowns.len(),
                response.info.len()
            );
            Ok(Json(response))
        }
        Ok(Err(e)) => {
            tracing::error!(
                "D400 Dashboard: failed to load {}: {}",
                state.dashboard_path().display(),
                e
            );
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
        Err(e) => {
            tracing::error!("D400 Dashboard: loader task failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/d400/orders-summary/refresh
pub async fn refresh_orders(State(state): State<Arc<AppState>>) -> StatusCode {
    state.refresh_orders();
    StatusCode::NO_CONTENT
}
