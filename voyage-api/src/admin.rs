use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use voyage_core::reservation::CatalogDestination;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DestinationRequest {
    pub city: String,
    pub country: String,
    pub description: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/admin/destinations",
            get(list_destinations).post(create_destination),
        )
        .route(
            "/v1/admin/destinations/{id}",
            get(get_destination)
                .put(update_destination)
                .delete(delete_destination),
        )
}

/// GET /v1/admin/destinations
async fn list_destinations(
    State(state): State<AppState>,
) -> Result<Json<Vec<CatalogDestination>>, AppError> {
    Ok(Json(state.destinations.list().await?))
}

/// POST /v1/admin/destinations
async fn create_destination(
    State(state): State<AppState>,
    Json(req): Json<DestinationRequest>,
) -> Result<(StatusCode, Json<CatalogDestination>), AppError> {
    let destination = CatalogDestination {
        id: Uuid::new_v4(),
        city: req.city,
        country: req.country,
        description: req.description,
    };
    state.destinations.create(&destination).await?;

    tracing::info!(city = %destination.city, country = %destination.country, "destination created");
    Ok((StatusCode::CREATED, Json(destination)))
}

/// GET /v1/admin/destinations/:id
async fn get_destination(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CatalogDestination>, AppError> {
    let destination = state
        .destinations
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Destination {} not found", id)))?;
    Ok(Json(destination))
}

/// PUT /v1/admin/destinations/:id
async fn update_destination(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DestinationRequest>,
) -> Result<Json<CatalogDestination>, AppError> {
    state
        .destinations
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Destination {} not found", id)))?;

    let destination = CatalogDestination {
        id,
        city: req.city,
        country: req.country,
        description: req.description,
    };
    state.destinations.update(id, &destination).await?;
    Ok(Json(destination))
}

/// DELETE /v1/admin/destinations/:id
async fn delete_destination(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state
        .destinations
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Destination {} not found", id)))?;

    state.destinations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
