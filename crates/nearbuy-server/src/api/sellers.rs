use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use nearbuy_core::{SearchFilter, DEFAULT_PAGE_LIMIT};
use nearbuy_geo::Coordinate;
use nearbuy_search::NearbySeller;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{checked_coordinate, map_search_error, normalize_limit, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct NearbyQuery {
    pub seller_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub name: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct PageMeta {
    pub limit: usize,
    pub offset: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct NearbyData {
    pub sellers: Vec<NearbySeller>,
    pub page: PageMeta,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(super) async fn find_nearby(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(coordinate): Path<String>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<ApiResponse<NearbyData>>, ApiError> {
    let user = coordinate
        .parse::<Coordinate>()
        .map_err(|e| ApiError::validation(req_id.0.clone(), e.to_string()))?;
    let user = checked_coordinate(&req_id.0, "coordinate", user)?;

    let limit = usize::try_from(normalize_limit(query.limit)).unwrap_or(DEFAULT_PAGE_LIMIT);
    let offset = usize::try_from(query.offset.unwrap_or(0))
        .map_err(|_| ApiError::validation(req_id.0.clone(), "offset must not be negative"))?;

    let filter = SearchFilter {
        seller_id: query.seller_id,
        name: non_blank(query.name),
        category: non_blank(query.category),
        limit,
        offset,
    };

    let page = state
        .engine
        .find_nearby(user, &filter)
        .await
        .map_err(|e| map_search_error(req_id.0.clone(), &e))?;

    Ok(ApiResponse::new(
        req_id.0,
        NearbyData {
            sellers: page.sellers,
            page: PageMeta {
                limit,
                offset,
                total: page.total,
            },
        },
    ))
}
