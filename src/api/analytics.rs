//! Handlers de Analytics
//!
//! Este módulo expone los informes de consumo por vehículo. Los datos se
//! piden al backend con la cabecera `Authorization` del llamante.

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::analysis::monthly::weighted_consumption_for;
use crate::cache::CacheStats;
use crate::models::{
    ConsumptionCycle, ConsumptionReport, FuelLogEntry, MonthlySource, MonthlyStats, ReasonCode, Vehicle, YearMonth,
};
use crate::state::AppState;
use crate::utils::errors::{validation_error, AppError, AppResult};

pub fn create_analytics_router() -> Router<AppState> {
    Router::new()
        .route("/vehicles/:id/report", get(get_report))
        .route("/vehicles/:id/consumption", get(get_consumption))
        .route("/vehicles/:id/history", get(get_history))
        .route("/vehicles/:id/monthly", get(get_monthly))
        .route("/vehicles/:id/monthly/:year/:month", get(get_month))
        .route("/vehicles/:id/cache", delete(invalidate_cache))
        .route("/cache/stats", get(get_cache_stats))
        .route("/analyze", post(analyze_inline))
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionResponse {
    pub vehicle_id: i64,
    pub avg_consumption_per_100km: f64,
    pub mean_cycle_consumption_per_100km: Option<f64>,
    pub insufficient_data: Option<ReasonCode>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthDetail {
    #[serde(flatten)]
    pub stats: MonthlyStats,
    /// Consumo ponderado por distancia del mes
    pub weighted_consumption_per_100km: f64,
    pub source: MonthlySource,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub vehicle: Vehicle,
    #[serde(default)]
    pub entries: Vec<FuelLogEntry>,
    #[serde(default)]
    pub backend_cycles: Option<Vec<ConsumptionCycle>>,
}

/// Informe completo del vehículo
async fn get_report(
    State(state): State<AppState>,
    Path(vehicle_id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Json<ConsumptionReport>> {
    let report = state
        .analytics
        .vehicle_report(vehicle_id, authorization(&headers))
        .await?;
    Ok(Json(report))
}

/// Consumo medio del vehículo
async fn get_consumption(
    State(state): State<AppState>,
    Path(vehicle_id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Json<ConsumptionResponse>> {
    let report = state
        .analytics
        .vehicle_report(vehicle_id, authorization(&headers))
        .await?;

    Ok(Json(ConsumptionResponse {
        vehicle_id,
        avg_consumption_per_100km: report.avg_consumption(),
        mean_cycle_consumption_per_100km: report.cycle_summary.as_ref().map(|s| s.mean),
        insufficient_data: report.insufficient_data,
    }))
}

/// Historial de ciclos calculados localmente
async fn get_history(
    State(state): State<AppState>,
    Path(vehicle_id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<ConsumptionCycle>>> {
    let report = state
        .analytics
        .vehicle_report(vehicle_id, authorization(&headers))
        .await?;
    Ok(Json(report.cycles))
}

/// Serie mensual del vehículo
async fn get_monthly(
    State(state): State<AppState>,
    Path(vehicle_id): Path<i64>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<MonthlyStats>>> {
    let report = state
        .analytics
        .vehicle_report(vehicle_id, authorization(&headers))
        .await?;
    Ok(Json(report.monthly_stats))
}

/// Un mes concreto de la serie mensual
async fn get_month(
    State(state): State<AppState>,
    Path((vehicle_id, year, month)): Path<(i64, i32, u32)>,
    headers: HeaderMap,
) -> AppResult<Json<MonthDetail>> {
    let year_month = YearMonth::new(year, month).ok_or_else(|| validation_error("month", "month must be between 1 and 12"))?;

    let report = state
        .analytics
        .vehicle_report(vehicle_id, authorization(&headers))
        .await?;

    let stats = report
        .monthly_stats
        .iter()
        .find(|m| m.month == year_month)
        .cloned()
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No consumption cycles for vehicle {} in {}",
                vehicle_id, year_month
            ))
        })?;

    let cycles = match (report.monthly_source, report.backend_cycles.as_deref()) {
        (MonthlySource::Backend, Some(backend)) => backend,
        _ => report.cycles.as_slice(),
    };

    Ok(Json(MonthDetail {
        weighted_consumption_per_100km: weighted_consumption_for(cycles, year_month),
        source: report.monthly_source,
        stats,
    }))
}

/// Descartar el informe memorizado de un vehículo
async fn invalidate_cache(
    State(state): State<AppState>,
    Path(vehicle_id): Path<i64>,
) -> Json<serde_json::Value> {
    let invalidated = state.analytics.invalidate(vehicle_id).await;
    Json(json!({
        "success": true,
        "vehicleId": vehicle_id,
        "invalidated": invalidated
    }))
}

async fn get_cache_stats(State(state): State<AppState>) -> Json<CacheStats> {
    Json(state.analytics.cache_stats().await)
}

/// Analizar un historial enviado en el cuerpo, sin pasar por el backend
async fn analyze_inline(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> AppResult<Json<ConsumptionReport>> {
    let report = state
        .analytics
        .analyze_inline(&request.vehicle, &request.entries, request.backend_cycles)?;
    Ok(Json(report))
}
