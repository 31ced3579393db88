//! HTTP API over the cleaning and statistics operations

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use ndarray::{Array1, Array2, ArrayD};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::cleaning::TableCleaner;
use crate::config::ServiceConfig;
use crate::error::DataError;
use crate::statistics::SequenceStatistics;
use crate::types::{Table, TableInput};

#[derive(Clone)]
struct AppState {
    config: ServiceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnsRequest {
    pub table: TableInput,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierRequest {
    pub table: TableInput,
    pub column: String,
    #[serde(default)]
    pub factor: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceRequest {
    pub values: SequenceValues,
    #[serde(default)]
    pub window: Option<usize>,
}

/// Flat values, or rows of values which are rejected as not one-dimensional.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SequenceValues {
    Flat(Vec<f64>),
    Nested(Vec<Vec<f64>>),
}

impl SequenceValues {
    pub fn len(&self) -> usize {
        match self {
            SequenceValues::Flat(values) => values.len(),
            SequenceValues::Nested(rows) => rows.iter().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_array(self) -> Result<ArrayD<f64>, DataError> {
        match self {
            SequenceValues::Flat(values) => Ok(Array1::from(values).into_dyn()),
            SequenceValues::Nested(rows) => {
                let n_cols = rows.first().map_or(0, Vec::len);
                let shape = (rows.len(), n_cols);
                let flat: Vec<f64> = rows.into_iter().flatten().collect();
                Array2::from_shape_vec(shape, flat)
                    .map(|array| array.into_dyn())
                    .map_err(|_| DataError::Shape { ndim: 2 })
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableResponse {
    pub table: Table,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceResponse {
    pub values: Vec<f64>,
}

/// Request failure rendered as `{"error", "kind"}`.
#[derive(Debug)]
pub enum ApiError {
    Data(DataError),
    Body(JsonRejection),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Data(DataError::MissingColumn(_)) => StatusCode::NOT_FOUND,
            ApiError::Data(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Body(rejection) => rejection.status(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Data(err) => err.kind(),
            ApiError::Body(_) => "invalid_body",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Data(err) => err.to_string(),
            ApiError::Body(rejection) => rejection.body_text(),
        }
    }
}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        ApiError::Data(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.message();
        tracing::warn!(kind = self.kind(), "Request rejected: {}", message);

        let body = serde_json::json!({
            "error": message,
            "kind": self.kind(),
        });
        (self.status(), Json(body)).into_response()
    }
}

pub fn router(config: ServiceConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/clean/trim", post(trim_strings))
        .route("/api/clean/drop-invalid", post(drop_invalid_rows))
        .route("/api/clean/outliers", post(remove_outliers))
        .route("/api/stats/moving-average", post(moving_average))
        .route("/api/stats/zscore", post(zscore))
        .route("/api/stats/min-max", post(min_max_scale))
        .layer(cors)
        .with_state(AppState { config })
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "tabstat API",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn trim_strings(
    payload: Result<Json<ColumnsRequest>, JsonRejection>,
) -> Result<Json<TableResponse>, ApiError> {
    let Json(req) = payload?;
    let input = Table::try_from(req.table)?;
    tracing::info!("Trim request: {} rows, columns {:?}", input.n_rows(), req.columns);

    let table = TableCleaner::trim_strings(&input, req.columns.as_slice())?;
    Ok(Json(TableResponse { table }))
}

async fn drop_invalid_rows(
    payload: Result<Json<ColumnsRequest>, JsonRejection>,
) -> Result<Json<TableResponse>, ApiError> {
    let Json(req) = payload?;
    let input = Table::try_from(req.table)?;
    tracing::info!("Drop-invalid request: {} rows, columns {:?}", input.n_rows(), req.columns);

    let table = TableCleaner::drop_invalid_rows(&input, req.columns.as_slice())?;
    Ok(Json(TableResponse { table }))
}

async fn remove_outliers(
    State(state): State<AppState>,
    payload: Result<Json<OutlierRequest>, JsonRejection>,
) -> Result<Json<TableResponse>, ApiError> {
    let Json(req) = payload?;
    let input = Table::try_from(req.table)?;
    let factor = req.factor.unwrap_or(state.config.default_iqr_factor);
    tracing::info!(
        "Outlier request: {} rows, column {}, factor {}",
        input.n_rows(),
        req.column,
        factor
    );

    let table = TableCleaner::remove_outliers_iqr(&input, &req.column, factor)?;
    Ok(Json(TableResponse { table }))
}

async fn moving_average(
    payload: Result<Json<SequenceRequest>, JsonRejection>,
) -> Result<Json<SequenceResponse>, ApiError> {
    let Json(req) = payload?;
    tracing::info!("Moving average request: {} values, window {:?}", req.values.len(), req.window);

    let window = req
        .window
        .ok_or_else(|| DataError::InvalidParameter("window is required".to_string()))?;
    let values = SequenceStatistics::moving_average(&req.values.into_array()?, window)?;
    Ok(Json(SequenceResponse {
        values: values.to_vec(),
    }))
}

async fn zscore(
    payload: Result<Json<SequenceRequest>, JsonRejection>,
) -> Result<Json<SequenceResponse>, ApiError> {
    let Json(req) = payload?;
    tracing::info!("Z-score request: {} values", req.values.len());

    let values = SequenceStatistics::zscore(&req.values.into_array()?)?;
    Ok(Json(SequenceResponse {
        values: values.to_vec(),
    }))
}

async fn min_max_scale(
    payload: Result<Json<SequenceRequest>, JsonRejection>,
) -> Result<Json<SequenceResponse>, ApiError> {
    let Json(req) = payload?;
    tracing::info!("Min-max request: {} values", req.values.len());

    let values = SequenceStatistics::min_max_scale(&req.values.into_array()?)?;
    Ok(Json(SequenceResponse {
        values: values.to_vec(),
    }))
}
