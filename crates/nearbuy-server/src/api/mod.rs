mod orders;
mod routes;
mod sellers;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use nearbuy_core::{CatalogStore, StoreError};
use nearbuy_geo::{Coordinate, GeoError, GeoGrid};
use nearbuy_search::{
    EstimateConfig, EstimateError, NearbySearchEngine, OrderEstimator, RouteConfig, RouteError,
    RoutePlanner, SearchConfig, SearchError,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::middleware::{request_id, RequestId, REQUEST_ID_HEADER};

const DEFAULT_LIMIT: i64 = 5;
const MAX_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<NearbySearchEngine>,
    pub planner: Arc<RoutePlanner>,
    pub estimator: Arc<OrderEstimator>,
    pub store: Arc<dyn CatalogStore>,
}

impl AppState {
    pub fn new(
        grid: Arc<dyn GeoGrid>,
        store: Arc<dyn CatalogStore>,
        search: SearchConfig,
        route: RouteConfig,
        estimate: EstimateConfig,
    ) -> Self {
        let planner = Arc::new(RoutePlanner::new(Arc::clone(&store), route));
        Self {
            engine: Arc::new(NearbySearchEngine::new(grid, Arc::clone(&store), search)),
            estimator: Arc::new(OrderEstimator::new(Arc::clone(&planner), estimate)),
            planner,
            store,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    catalog: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    pub(super) fn validation(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(request_id, "validation_error", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "timeout" => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Validates a coordinate received from a client.
pub(super) fn checked_coordinate(
    request_id: &str,
    field: &str,
    coordinate: Coordinate,
) -> Result<Coordinate, ApiError> {
    coordinate
        .validate()
        .map(|()| coordinate)
        .map_err(|e| ApiError::validation(request_id, format!("{field}: {e}")))
}

pub(super) fn map_store_error(request_id: String, error: &StoreError) -> ApiError {
    match error {
        StoreError::NotFound { .. } => ApiError::new(request_id, "not_found", error.to_string()),
        StoreError::Backend(_) => {
            tracing::error!(error = %error, "catalog query failed");
            ApiError::new(request_id, "internal_error", "catalog query failed")
        }
    }
}

pub(super) fn map_search_error(request_id: String, error: &SearchError) -> ApiError {
    match error {
        SearchError::Store(e) => map_store_error(request_id, e),
        SearchError::InvalidLimit | SearchError::Grid(GeoError::InvalidCoordinate(_)) => {
            ApiError::validation(request_id, error.to_string())
        }
        SearchError::DeadlineExceeded { .. } => {
            tracing::warn!(error = %error, "nearby search timed out");
            ApiError::new(request_id, "timeout", error.to_string())
        }
        SearchError::Grid(_) => {
            tracing::error!(error = %error, "nearby search failed");
            ApiError::new(request_id, "internal_error", "nearby search failed")
        }
    }
}

pub(super) fn map_route_error(request_id: String, error: &RouteError) -> ApiError {
    match error {
        RouteError::Store(e) => map_store_error(request_id, e),
        RouteError::TooManyStops { .. } | RouteError::DuplicateStop(_) => {
            ApiError::validation(request_id, error.to_string())
        }
    }
}

pub(super) fn map_estimate_error(request_id: String, error: &EstimateError) -> ApiError {
    match error {
        EstimateError::Store(e) => map_store_error(request_id, e),
        EstimateError::Route(e) => map_route_error(request_id, e),
        EstimateError::PriceOverflow => {
            tracing::error!(error = %error, "order estimate failed");
            ApiError::new(request_id, "internal_error", error.to_string())
        }
        EstimateError::NoOrders
        | EstimateError::InvalidStartingPoint { .. }
        | EstimateError::InvalidQuantity { .. }
        | EstimateError::SellerTooFar { .. }
        | EstimateError::ItemNotFound { .. } => {
            ApiError::validation(request_id, error.to_string())
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route(
            "/api/v1/sellers/nearby/{coordinate}",
            get(sellers::find_nearby),
        )
        .route("/api/v1/routes/optimal", post(routes::find_optimal_route))
        .route("/api/v1/orders/estimate", post(orders::estimate_order))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    catalog: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: catalog unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        catalog: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
