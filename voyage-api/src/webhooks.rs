use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;

use voyage_booking::PaymentError;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StripeWebhook {
    pub id: String,
    #[serde(rename = "type")]
    pub type_: String,
    pub data: WebhookData,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub object: PaymentIntentObject,
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntentObject {
    pub id: String,
    pub status: String,
    pub last_payment_error: Option<PaymentIntentError>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentIntentError {
    pub message: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/webhooks/payments/stripe", post(handle_stripe_webhook))
}

/// POST /v1/webhooks/payments/stripe
/// Receive payment status updates from Stripe
pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    Json(payload): Json<StripeWebhook>,
) -> Result<StatusCode, StatusCode> {
    tracing::info!(
        event = %payload.type_,
        intent_id = %payload.data.object.id,
        "received payment webhook"
    );

    let intent_id = &payload.data.object.id;

    let result = match payload.type_.as_str() {
        "payment_intent.succeeded" => state.payment_bridge.confirm(intent_id).await.map(|_| ()),
        "payment_intent.payment_failed" | "payment_intent.canceled" => {
            let reason = payload
                .data
                .object
                .last_payment_error
                .as_ref()
                .and_then(|e| e.message.clone())
                .unwrap_or_else(|| payload.data.object.status.clone());
            state
                .payment_bridge
                .fail(intent_id, &reason)
                .await
                .map(|_| ())
        }
        _ => return Ok(StatusCode::OK),
    };

    match result {
        Ok(()) => Ok(StatusCode::OK),
        // Acknowledge unknown intents so the processor stops retrying them.
        Err(PaymentError::NotFound(_)) => {
            tracing::warn!(intent_id, "webhook for unknown payment intent");
            Ok(StatusCode::OK)
        }
        Err(err) => {
            tracing::error!(error = %err, intent_id, "webhook processing failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
