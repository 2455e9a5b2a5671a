use axum::{extract::State, Extension, Json};
use nearbuy_search::{Estimate, OrderRequest};

use crate::middleware::RequestId;

use super::{checked_coordinate, map_estimate_error, ApiError, ApiResponse, AppState};

pub(super) async fn estimate_order(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<OrderRequest>,
) -> Result<Json<ApiResponse<Estimate>>, ApiError> {
    checked_coordinate(&req_id.0, "userLocation", body.user_location)?;

    let estimate = state
        .estimator
        .estimate(&body)
        .await
        .map_err(|e| map_estimate_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(req_id.0, estimate))
}
