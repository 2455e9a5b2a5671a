use axum::{extract::State, Extension, Json};
use nearbuy_core::RouteResult;
use nearbuy_geo::Coordinate;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{checked_coordinate, map_route_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct OptimalRouteRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    #[serde(default)]
    pub seller_ids: Vec<i64>,
}

pub(super) async fn find_optimal_route(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<OptimalRouteRequest>,
) -> Result<Json<ApiResponse<RouteResult>>, ApiError> {
    let origin = checked_coordinate(&req_id.0, "origin", body.origin)?;
    let destination = checked_coordinate(&req_id.0, "destination", body.destination)?;

    let route = state
        .planner
        .find_optimal_route(origin, destination, &body.seller_ids)
        .await
        .map_err(|e| map_route_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(req_id.0, route))
}
