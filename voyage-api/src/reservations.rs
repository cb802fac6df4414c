use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use voyage_booking::{build_reservation, transition_allowed};
use voyage_core::reservation::{
    FlightDetails, HotelDetails, Reservation, ReservationStatus, ReservationType,
};

use crate::error::AppError;
use crate::middleware::auth::{is_admin, Claims};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    #[serde(rename = "type")]
    pub kind: ReservationType,
    pub flight: Option<FlightDetails>,
    pub hotel: Option<HotelDetails>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/reservations",
            post(create_reservation).get(list_my_reservations),
        )
        .route("/v1/reservations/{id}", get(get_reservation))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/reservations", get(list_all_reservations))
        .route(
            "/v1/admin/reservations/{id}/status",
            patch(update_reservation_status),
        )
}

fn user_id_from(claims: &Claims) -> Result<Uuid, AppError> {
    Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Malformed subject claim".to_string()))
}

/// POST /v1/reservations
async fn create_reservation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<Reservation>), AppError> {
    let user_id = user_id_from(&claims)?;

    let reservation = build_reservation(user_id, &claims.email, req.kind, req.flight, req.hotel)?;

    state.reservations.create(&reservation).await?;

    tracing::info!(
        reservation_id = %reservation.id,
        user = %claims.email,
        total = reservation.total_price,
        "reservation created"
    );
    Ok((StatusCode::CREATED, Json(reservation)))
}

/// GET /v1/reservations
async fn list_my_reservations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    let user_id = user_id_from(&claims)?;
    let reservations = state.reservations.list_for_user(user_id).await?;
    Ok(Json(reservations))
}

/// GET /v1/reservations/:id
async fn get_reservation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<Reservation>, AppError> {
    let user_id = user_id_from(&claims)?;

    let reservation = state
        .reservations
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))?;

    if reservation.user_id != user_id && !is_admin(&claims) {
        return Err(AppError::Forbidden(
            "Reservation does not belong to you".to_string(),
        ));
    }

    Ok(Json(reservation))
}

/// GET /v1/admin/reservations
async fn list_all_reservations(
    State(state): State<AppState>,
) -> Result<Json<Vec<Reservation>>, AppError> {
    let reservations = state.reservations.list_all().await?;
    Ok(Json(reservations))
}

/// PATCH /v1/admin/reservations/:id/status
///
/// Administrator overrides go through the same transition guard as
/// payment-driven updates.
async fn update_reservation_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusUpdateRequest>,
) -> Result<Json<Reservation>, AppError> {
    let new_status = ReservationStatus::parse(&req.status)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown status '{}'", req.status)))?;

    let mut reservation = state
        .reservations
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", id)))?;

    if !transition_allowed(reservation.status, new_status) {
        return Err(AppError::Conflict(format!(
            "Invalid status transition from {} to {}",
            reservation.status, new_status
        )));
    }

    state.reservations.set_status(id, new_status).await?;
    reservation.status = new_status;

    tracing::info!(reservation_id = %id, status = %new_status, "reservation status updated");
    Ok(Json(reservation))
}
