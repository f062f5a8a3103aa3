use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sysdeck_core::{
    CoreError, LogEntry, LogFilter, LogLevel, LogQuery, LogStats, ProgressTask, ProgressTracker,
};
use uuid::Uuid;

use crate::app::Services;
use crate::managers::ManagerError;
use crate::models::*;

const DEFAULT_LOG_LIMIT: usize = 100;

type ApiResult<T> = Result<T, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Map a manager error to a status code. Caller mistakes are returned as-is;
/// anything else is logged server-side and the client gets a generic message.
fn manager_error(e: ManagerError) -> (StatusCode, String) {
    let status = match &e {
        ManagerError::Core(CoreError::NotInitialized { .. }) => StatusCode::SERVICE_UNAVAILABLE,
        ManagerError::NotFound { .. } | ManagerError::Core(CoreError::TaskNotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        ManagerError::Invalid(_) | ManagerError::Core(CoreError::TaskFinished { .. }) => {
            StatusCode::BAD_REQUEST
        }
        _ => {
            tracing::error!("Internal error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            );
        }
    };
    tracing::warn!("Request failed: {}", e);
    (status, e.to_string())
}

fn core_error(e: CoreError) -> (StatusCode, String) {
    manager_error(ManagerError::Core(e))
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Application Log
// ============================================================

#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct LogSearchQuery {
    pub q: Option<String>,
    pub source: Option<String>,
    pub level: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl LogSearchQuery {
    fn into_query(self) -> ApiResult<LogQuery> {
        let level = match self.level.as_deref() {
            Some(raw) => Some(LogLevel::from_str(raw).ok_or((
                StatusCode::BAD_REQUEST,
                format!("Unknown log level: {}", raw),
            ))?),
            None => None,
        };

        if self.source.is_none() && level.is_none() && self.start.is_none() && self.end.is_none()
        {
            return Ok(LogQuery::Keyword(self.q.unwrap_or_default()));
        }

        Ok(LogQuery::Filter(LogFilter {
            source: self.source,
            level,
            start_date: self.start,
            end_date: self.end,
            keyword: self.q,
        }))
    }
}

pub async fn list_logs(
    State(services): State<Services>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<LogEntry>> {
    Json(
        services
            .log
            .get_recent(query.limit.unwrap_or(DEFAULT_LOG_LIMIT)),
    )
}

pub async fn search_logs(
    State(services): State<Services>,
    Query(query): Query<LogSearchQuery>,
) -> ApiResult<Json<Vec<LogEntry>>> {
    let query = query.into_query()?;
    Ok(Json(services.log.search(query)))
}

pub async fn log_stats(State(services): State<Services>) -> Json<LogStats> {
    Json(services.log.get_stats())
}

pub async fn logs_by_source(
    State(services): State<Services>,
    Path(source): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Json<Vec<LogEntry>> {
    Json(services.log.get_by_manager(&source, query.limit))
}

pub async fn clear_logs(State(services): State<Services>) -> StatusCode {
    services.log.clear();
    StatusCode::NO_CONTENT
}

// ============================================================
// Progress
// ============================================================

pub async fn list_progress(State(services): State<Services>) -> Json<Vec<ProgressTask>> {
    Json(services.progress.get_tasks())
}

pub async fn list_running_progress(State(services): State<Services>) -> Json<Vec<ProgressTask>> {
    Json(services.progress.get_running_tasks())
}

pub async fn get_progress(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProgressTask>> {
    services
        .progress
        .get_task(id)
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Task not found".to_string()))
}

pub async fn remove_progress(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let removed = services.progress.remove_task(id).map_err(core_error)?;
    Ok(Json(serde_json::json!({ "removed": removed })))
}

pub async fn cleanup_progress(
    State(services): State<Services>,
) -> ApiResult<Json<serde_json::Value>> {
    let removed = services.progress.cleanup().map_err(core_error)?;
    Ok(Json(serde_json::json!({ "removed": removed })))
}

// ============================================================
// Dashboard
// ============================================================

pub async fn get_dashboard(State(services): State<Services>) -> ApiResult<Json<Dashboard>> {
    services.dashboard.build().map(Json).map_err(manager_error)
}

// ============================================================
// Assets
// ============================================================

pub async fn list_assets(State(services): State<Services>) -> ApiResult<Json<Vec<Asset>>> {
    services.assets.list().map(Json).map_err(manager_error)
}

pub async fn get_asset(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Asset>> {
    services
        .assets
        .get(id)
        .map_err(manager_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Asset not found".to_string()))
}

pub async fn create_asset(
    State(services): State<Services>,
    Json(input): Json<CreateAssetInput>,
) -> ApiResult<(StatusCode, Json<Asset>)> {
    services
        .assets
        .create(input)
        .await
        .map(|a| (StatusCode::CREATED, Json(a)))
        .map_err(manager_error)
}

pub async fn update_asset(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateAssetInput>,
) -> ApiResult<Json<Asset>> {
    services
        .assets
        .update(id, input)
        .await
        .map(Json)
        .map_err(manager_error)
}

pub async fn delete_asset(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    services
        .assets
        .delete(id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(manager_error)
}

// ============================================================
// Files
// ============================================================

pub async fn list_files(State(services): State<Services>) -> ApiResult<Json<Vec<FileRecord>>> {
    services.files.list().map(Json).map_err(manager_error)
}

pub async fn get_file(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FileRecord>> {
    services
        .files
        .get(id)
        .map_err(manager_error)?
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "File not found".to_string()))
}

pub async fn add_file(
    State(services): State<Services>,
    Json(input): Json<AddFileInput>,
) -> ApiResult<(StatusCode, Json<FileRecord>)> {
    services
        .files
        .add(input)
        .await
        .map(|f| (StatusCode::CREATED, Json(f)))
        .map_err(manager_error)
}

pub async fn update_file(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateFileInput>,
) -> ApiResult<Json<FileRecord>> {
    services
        .files
        .update(id, input)
        .await
        .map(Json)
        .map_err(manager_error)
}

pub async fn delete_file(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    services
        .files
        .delete(id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(manager_error)
}

// ============================================================
// Finance
// ============================================================

pub async fn list_transactions(
    State(services): State<Services>,
) -> ApiResult<Json<Vec<Transaction>>> {
    services.finance.list().map(Json).map_err(manager_error)
}

pub async fn create_transaction(
    State(services): State<Services>,
    Json(input): Json<CreateTransactionInput>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    services
        .finance
        .record(input)
        .await
        .map(|t| (StatusCode::CREATED, Json(t)))
        .map_err(manager_error)
}

pub async fn finance_summary(State(services): State<Services>) -> ApiResult<Json<FinanceSummary>> {
    services.finance.summary().map(Json).map_err(manager_error)
}

pub async fn delete_transaction(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    services
        .finance
        .delete(id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(manager_error)
}

// ============================================================
// IoT Devices
// ============================================================

pub async fn list_devices(State(services): State<Services>) -> ApiResult<Json<Vec<IotDevice>>> {
    services.iot.list().map(Json).map_err(manager_error)
}

pub async fn register_device(
    State(services): State<Services>,
    Json(input): Json<RegisterDeviceInput>,
) -> ApiResult<(StatusCode, Json<IotDevice>)> {
    services
        .iot
        .register(input)
        .await
        .map(|d| (StatusCode::CREATED, Json(d)))
        .map_err(manager_error)
}

pub async fn update_device(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateDeviceInput>,
) -> ApiResult<Json<IotDevice>> {
    services
        .iot
        .update(id, input)
        .await
        .map(Json)
        .map_err(manager_error)
}

pub async fn remove_device(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    services
        .iot
        .remove(id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(manager_error)
}

// ============================================================
// Network Hosts
// ============================================================

pub async fn list_hosts(State(services): State<Services>) -> ApiResult<Json<Vec<NetworkHost>>> {
    services.network.list().map(Json).map_err(manager_error)
}

pub async fn add_host(
    State(services): State<Services>,
    Json(input): Json<AddHostInput>,
) -> ApiResult<(StatusCode, Json<NetworkHost>)> {
    services
        .network
        .add(input)
        .await
        .map(|h| (StatusCode::CREATED, Json(h)))
        .map_err(manager_error)
}

pub async fn record_probe(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
    Json(input): Json<ProbeResultInput>,
) -> ApiResult<Json<NetworkHost>> {
    services
        .network
        .record_probe(id, input)
        .await
        .map(Json)
        .map_err(manager_error)
}

pub async fn remove_host(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    services
        .network
        .remove(id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(manager_error)
}

// ============================================================
// Schedule
// ============================================================

pub async fn list_events(State(services): State<Services>) -> ApiResult<Json<Vec<ScheduleEvent>>> {
    services.schedule.list().map(Json).map_err(manager_error)
}

pub async fn upcoming_events(
    State(services): State<Services>,
) -> ApiResult<Json<Vec<ScheduleEvent>>> {
    services
        .schedule
        .upcoming(Utc::now())
        .map(Json)
        .map_err(manager_error)
}

pub async fn create_event(
    State(services): State<Services>,
    Json(input): Json<CreateEventInput>,
) -> ApiResult<(StatusCode, Json<ScheduleEvent>)> {
    services
        .schedule
        .create(input)
        .await
        .map(|e| (StatusCode::CREATED, Json(e)))
        .map_err(manager_error)
}

pub async fn complete_event(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ScheduleEvent>> {
    services
        .schedule
        .complete(id)
        .await
        .map(Json)
        .map_err(manager_error)
}

pub async fn delete_event(
    State(services): State<Services>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    services
        .schedule
        .delete(id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(manager_error)
}

// ============================================================
// System
// ============================================================

pub async fn get_system(
    State(services): State<Services>,
) -> ApiResult<Json<Option<SystemSnapshot>>> {
    services.system.latest().map(Json).map_err(manager_error)
}

pub async fn refresh_system(State(services): State<Services>) -> ApiResult<Json<SystemSnapshot>> {
    services.system.refresh().await.map(Json).map_err(manager_error)
}
