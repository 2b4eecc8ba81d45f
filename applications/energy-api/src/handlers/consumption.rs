use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde_json::json;
use tracing::error;

use crate::error::{AppError, Result};
use crate::models::{MonthlyQueryParams, RangeQueryParams};
use crate::routes::AppState;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "service": "energy-api",
        "endpoints": [
            "/health",
            "/api/hourly",
            "/api/daily",
            "/api/daily/:date",
            "/api/monthly",
            "/api/monthly/:year/:month",
            "/api/latest",
            "/api/stats"
        ]
    }))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.service.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({"status": "healthy", "database": "connected"})),
        ),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unhealthy", "database": "disconnected"})),
            )
        }
    }
}

pub async fn get_hourly(
    State(state): State<AppState>,
    Query(params): Query<RangeQueryParams>,
) -> Result<impl IntoResponse> {
    let records = state.service.hourly(params).await?;
    Ok(Json(records))
}

pub async fn get_daily(
    State(state): State<AppState>,
    Query(params): Query<RangeQueryParams>,
) -> Result<impl IntoResponse> {
    let records = state.service.daily(params).await?;
    Ok(Json(records))
}

pub async fn get_daily_by_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<impl IntoResponse> {
    let date: NaiveDate = date
        .parse()
        .map_err(|_| AppError::Validation("Date must be formatted as YYYY-MM-DD".to_string()))?;
    let record = state.service.daily_by_date(date).await?;
    Ok(Json(record))
}

pub async fn get_monthly(
    State(state): State<AppState>,
    Query(params): Query<MonthlyQueryParams>,
) -> Result<impl IntoResponse> {
    let records = state.service.monthly(params).await?;
    Ok(Json(records))
}

pub async fn get_monthly_by_month(
    State(state): State<AppState>,
    Path((year, month)): Path<(i64, i64)>,
) -> Result<impl IntoResponse> {
    let record = state.service.monthly_by_month(year, month).await?;
    Ok(Json(record))
}

pub async fn get_latest(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let record = state.service.latest().await?;
    Ok(Json(record))
}

pub async fn get_stats(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let stats = state.service.stats().await?;
    Ok(Json(stats))
}
