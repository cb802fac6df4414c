use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use voyage_api::middleware::auth::{is_admin, Claims, ROLE_ADMIN, ROLE_USER};
use voyage_api::payments::PaymentIntentResponse;
use voyage_api::reservations::CreateReservationRequest;
use voyage_core::payment::{Payment, PaymentStatus};

const TEST_SECRET: &str = "integration-test-secret";

fn issue_token(role: &str) -> String {
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        email: "traveler@example.com".to_string(),
        role: role.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

#[test]
fn test_jwt_roundtrip_preserves_claims() {
    let token = issue_token(ROLE_USER);

    let decoded = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(TEST_SECRET.as_bytes()),
        &Validation::default(),
    )
    .unwrap();

    assert_eq!(decoded.claims.role, ROLE_USER);
    assert_eq!(decoded.claims.email, "traveler@example.com");
    assert!(Uuid::parse_str(&decoded.claims.sub).is_ok());
    assert!(!is_admin(&decoded.claims));
}

#[test]
fn test_token_signed_with_other_secret_is_rejected() {
    let token = issue_token(ROLE_ADMIN);

    let result = decode::<Claims>(
        &token,
        &DecodingKey::from_secret(b"a-different-secret"),
        &Validation::default(),
    );

    assert!(result.is_err());
}

#[test]
fn test_admin_role_check() {
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        email: "ops@example.com".to_string(),
        role: ROLE_ADMIN.to_string(),
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    assert!(is_admin(&claims));
}

#[test]
fn test_reservation_request_uses_type_field() {
    let body = serde_json::json!({
        "type": "HOTEL",
        "hotel": {
            "external_hotel_id": "MCRAK001",
            "hotel_name": "Riad Dar Anika",
            "city": "Marrakech",
            "check_in": "2026-02-15",
            "check_out": "2026-02-18",
            "room_count": 1,
            "price_per_night": 100.0,
            "total_price": 300.0
        }
    });

    let request: CreateReservationRequest = serde_json::from_value(body).unwrap();
    assert!(request.flight.is_none());
    assert_eq!(request.hotel.unwrap().total_price, 300.0);
}

#[test]
fn test_payment_response_shape() {
    let payment = Payment {
        id: Uuid::new_v4(),
        reservation_id: Uuid::new_v4(),
        amount: 800.0,
        intent_id: "pi_123".to_string(),
        client_secret: Some("pi_123_secret".to_string()),
        status: PaymentStatus::Pending,
        failure_reason: None,
        created_at: Utc::now(),
    };

    let response: PaymentIntentResponse = payment.into();
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["payment_intent_id"], "pi_123");
    assert_eq!(json["status"], "PENDING");
    assert_eq!(json["amount"], 800.0);
}
