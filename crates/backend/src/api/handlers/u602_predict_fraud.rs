use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use contracts::usecases::common::UseCaseError;
use contracts::usecases::u602_predict_fraud::{PredictionFailure, PredictionResponse, UploadedSheet};
use std::sync::Arc;

use crate::shared::app_state::AppState;
use crate::shared::frame::RawTable;
use crate::usecases::u602_predict_fraud::PredictError;

type Failure = (StatusCode, Json<PredictionFailure>);

fn bad_request(message: impl Into<String>) -> Failure {
    (
        StatusCode::BAD_REQUEST,
        Json(PredictionFailure {
            error: UseCaseError::new("BAD_REQUEST", message),
            column_mismatch: None,
        }),
    )
}

fn failure(e: &PredictError) -> Failure {
    let status = match e {
        PredictError::Validation { .. } => {
            tracing::warn!("U602: upload rejected: {}", e);
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PredictError::Pipeline(_) => {
            tracing::error!("U602: prediction failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(e.to_failure()))
}

/// Reads the `file` field of a multipart upload as CSV
async fn read_upload(mut multipart: Multipart) -> Result<(RawTable, String), Failure> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload.csv").to_string();
        let data = field.bytes().await.map_err(|e| bad_request(e.to_string()))?;
        tracing::info!("U602: received '{}' ({} bytes)", file_name, data.len());

        let table = RawTable::from_csv_bytes(&data)
            .map_err(|e| bad_request(format!("cannot read '{}' as CSV: {}", file_name, e)))?;
        return Ok((table, file_name));
    }
    Err(bad_request("multipart field 'file' is missing"))
}

/// Scoring is CPU-bound and reads artifacts from disk
async fn score(
    state: Arc<AppState>,
    table: RawTable,
    file_name: String,
) -> Result<PredictionResponse, Failure> {
    let result = tokio::task::spawn_blocking(move || state.predictor().execute(&table, &file_name))
        .await
        .map_err(|e| failure(&PredictError::Pipeline(e.to_string())))?;
    result.map_err(|e| failure(&e))
}

/// POST /api/u602/predict (multipart, поле `file`)
pub async fn predict_upload(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<PredictionResponse>, Failure> {
    let (table, file_name) = read_upload(multipart).await?;
    score(state, table, file_name).await.map(Json)
}

/// POST /api/u602/predict-json (лист, разобранный на клиенте)
pub async fn predict_sheet(
    State(state): State<Arc<AppState>>,
    Json(sheet): Json<UploadedSheet>,
) -> Result<Json<PredictionResponse>, Failure> {
    let table = RawTable::from_sheet(&sheet.file_headers, &sheet.rows)
        .map_err(|e| bad_request(format!("cannot read sheet: {}", e)))?;
    let file_name = sheet.file_name.unwrap_or_else(|| "upload.csv".to_string());
    tracing::info!("U602: received sheet '{}' ({} rows)", file_name, table.row_count());
    score(state, table, file_name).await.map(Json)
}

/// POST /api/u602/predict/export: исходный файл + колонка предсказания
pub async fn export_predictions(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, Failure> {
    let (table, file_name) = read_upload(multipart).await?;
    let response = score(state, table, file_name).await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        response.export_file_name.replace('"', "")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        response.export_csv,
    )
        .into_response())
}
