use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use voyage_core::payment::Payment;

use crate::error::AppError;
use crate::middleware::auth::{is_admin, Claims};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PaymentIntentResponse {
    pub payment_intent_id: String,
    pub client_secret: Option<String>,
    pub amount: f64,
    pub status: String,
}

impl From<Payment> for PaymentIntentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            payment_intent_id: payment.intent_id,
            client_secret: payment.client_secret,
            amount: payment.amount,
            status: payment.status.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FailPaymentRequest {
    pub reason: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/reservations/{id}/payment-intent",
            post(create_payment_intent),
        )
        .route("/v1/reservations/{id}/payment", get(get_payment))
        .route("/v1/payments/{intent_id}/confirm", post(confirm_payment))
        .route("/v1/payments/{intent_id}/fail", post(fail_payment))
}

async fn owned_reservation(
    state: &AppState,
    claims: &Claims,
    reservation_id: Uuid,
) -> Result<voyage_core::reservation::Reservation, AppError> {
    let reservation = state
        .reservations
        .get(reservation_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Reservation {} not found", reservation_id)))?;

    if reservation.user_id.to_string() != claims.sub && !is_admin(claims) {
        return Err(AppError::Forbidden(
            "Reservation does not belong to you".to_string(),
        ));
    }
    Ok(reservation)
}

/// POST /v1/reservations/:id/payment-intent
///
/// Idempotent: repeat calls return the existing payment instead of opening
/// a second transaction with the processor.
async fn create_payment_intent(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    let reservation = owned_reservation(&state, &claims, reservation_id).await?;

    let payment = state.payment_bridge.create_intent(&reservation).await?;

    Ok(Json(payment.into()))
}

/// GET /v1/reservations/:id/payment
async fn get_payment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(reservation_id): Path<Uuid>,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    owned_reservation(&state, &claims, reservation_id).await?;

    let payment = state
        .payments
        .find_by_reservation(reservation_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("No payment for reservation {}", reservation_id))
        })?;

    Ok(Json(payment.into()))
}

/// POST /v1/payments/:intent_id/confirm
async fn confirm_payment(
    State(state): State<AppState>,
    Path(intent_id): Path<String>,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    let payment = state.payment_bridge.confirm(&intent_id).await?;

    Ok(Json(payment.into()))
}

/// POST /v1/payments/:intent_id/fail
async fn fail_payment(
    State(state): State<AppState>,
    Path(intent_id): Path<String>,
    Json(req): Json<FailPaymentRequest>,
) -> Result<Json<PaymentIntentResponse>, AppError> {
    let payment = state.payment_bridge.fail(&intent_id, &req.reason).await?;

    Ok(Json(payment.into()))
}
