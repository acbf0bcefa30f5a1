//! Tour catalog API handlers
//!
//! List, create, fetch, update, and delete travel packages.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use worldtour_common::db::tours::{self, Tour, TourFilter, TourPayload};

use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, PAGE_SIZE};
use crate::AppState;

/// Query parameters for the tour listing
#[derive(Debug, Deserialize)]
pub struct ListToursQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    pub page: i64,

    /// Exact match on origin country
    pub origin: Option<String>,

    /// Exact match on destination country
    pub destination: Option<String>,

    /// Upper bound on price
    pub max_price: Option<f64>,

    /// Upper bound on duration in days
    pub max_duration: Option<i64>,
}

fn default_page() -> i64 {
    1
}

impl ListToursQuery {
    fn filter(&self) -> TourFilter {
        TourFilter {
            origin_country: self.origin.clone().filter(|s| !s.is_empty()),
            destination_country: self.destination.clone().filter(|s| !s.is_empty()),
            max_price: self.max_price,
            max_duration: self.max_duration,
        }
    }
}

/// One tour as rendered on the wire
#[derive(Debug, Serialize)]
pub struct TourResponse {
    pub guid: Uuid,
    pub origin_country: String,
    pub destination_country: String,
    pub price: String,
    pub duration: i64,
    pub description: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Tour> for TourResponse {
    fn from(tour: Tour) -> Self {
        Self {
            guid: tour.guid,
            origin_country: tour.origin_country,
            destination_country: tour.destination_country,
            price: tour.price.to_string(),
            duration: tour.duration,
            description: tour.description,
            created_at: tour.created_at.map(|t| t.to_string()),
            updated_at: tour.updated_at.map(|t| t.to_string()),
        }
    }
}

/// Tour listing response
#[derive(Debug, Serialize)]
pub struct TourListResponse {
    pub total_rows: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub tours: Vec<TourResponse>,
}

/// Delete response
#[derive(Debug, Serialize)]
pub struct DeleteTourResponse {
    pub status: String,
    pub guid: Uuid,
}

/// GET /api/tours
///
/// Returns a page of tours, newest first, optionally filtered by origin,
/// destination, maximum price, and maximum duration.
pub async fn list_tours(
    State(state): State<AppState>,
    Query(query): Query<ListToursQuery>,
) -> ApiResult<Json<TourListResponse>> {
    let filter = query.filter();

    let total_rows = tours::count_tours(&state.db, &filter).await?;
    let p = calculate_pagination(total_rows, query.page);

    let page = tours::list_tours(&state.db, &filter, PAGE_SIZE, p.offset).await?;

    Ok(Json(TourListResponse {
        total_rows,
        page: p.page,
        page_size: PAGE_SIZE,
        total_pages: p.total_pages,
        tours: page.into_iter().map(TourResponse::from).collect(),
    }))
}

/// POST /api/tours
///
/// Validates the payload and stores a new tour. Returns 201 with the
/// stored record, including the server-assigned guid and timestamps.
pub async fn create_tour(
    State(state): State<AppState>,
    Json(payload): Json<TourPayload>,
) -> ApiResult<(StatusCode, Json<TourResponse>)> {
    let tour = Tour::new(payload)?;

    tracing::info!(guid = %tour.guid, "Create tour");
    tours::insert_tour(&state.db, &tour).await?;

    // Re-load so the response carries the database-assigned timestamps
    let stored = tours::load_tour(&state.db, tour.guid)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("tour {} missing after insert", tour.guid)))?;

    Ok((StatusCode::CREATED, Json(stored.into())))
}

/// GET /api/tours/:guid
pub async fn get_tour(
    State(state): State<AppState>,
    Path(guid): Path<Uuid>,
) -> ApiResult<Json<TourResponse>> {
    let tour = tours::load_tour(&state.db, guid)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("tour {}", guid)))?;

    Ok(Json(tour.into()))
}

/// PUT /api/tours/:guid
///
/// Full update of the user fields. The guid and created_at are immutable;
/// updated_at is bumped by the database.
pub async fn update_tour(
    State(state): State<AppState>,
    Path(guid): Path<Uuid>,
    Json(payload): Json<TourPayload>,
) -> ApiResult<Json<TourResponse>> {
    let tour = payload.into_tour(guid)?;

    tracing::info!(guid = %guid, "Update tour");
    let matched = tours::update_tour(&state.db, &tour).await?;
    if !matched {
        return Err(ApiError::NotFound(format!("tour {}", guid)));
    }

    let stored = tours::load_tour(&state.db, guid)
        .await?
        .ok_or_else(|| ApiError::Internal(format!("tour {} missing after update", guid)))?;

    Ok(Json(stored.into()))
}

/// DELETE /api/tours/:guid
pub async fn delete_tour(
    State(state): State<AppState>,
    Path(guid): Path<Uuid>,
) -> ApiResult<Json<DeleteTourResponse>> {
    tracing::info!(guid = %guid, "Delete tour");

    let matched = tours::delete_tour(&state.db, guid).await?;
    if !matched {
        return Err(ApiError::NotFound(format!("tour {}", guid)));
    }

    Ok(Json(DeleteTourResponse {
        status: "deleted".to_string(),
        guid,
    }))
}
