use chrono::Utc;
use uuid::Uuid;

use voyage_core::reservation::{
    FlightDetails, HotelDetails, Reservation, ReservationStatus, ReservationType,
};

#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("A reservation needs at least one of flight or hotel data")]
    MissingSegments,

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: ReservationStatus,
        to: ReservationStatus,
    },
}

/// Assemble a reservation from the optional flight/hotel sub-records.
///
/// The total price is the sum of the prices present at creation time and is
/// never recomputed. The initial status is always PENDING regardless of what
/// the caller sends.
pub fn build_reservation(
    user_id: Uuid,
    user_email: &str,
    kind: ReservationType,
    flight: Option<FlightDetails>,
    hotel: Option<HotelDetails>,
) -> Result<Reservation, ReservationError> {
    if flight.is_none() && hotel.is_none() {
        return Err(ReservationError::MissingSegments);
    }

    let total_price = flight.as_ref().map(|f| f.price).unwrap_or(0.0)
        + hotel.as_ref().map(|h| h.total_price).unwrap_or(0.0);

    Ok(Reservation {
        id: Uuid::new_v4(),
        user_id,
        user_email: user_email.to_string(),
        kind,
        status: ReservationStatus::Pending,
        total_price,
        flight,
        hotel,
        created_at: Utc::now(),
    })
}

/// Allowed status transitions. Applies to payment-driven updates and
/// administrator overrides alike; there is no force path.
pub fn transition_allowed(from: ReservationStatus, to: ReservationStatus) -> bool {
    use ReservationStatus::*;
    matches!(
        (from, to),
        (Pending, Confirmed)
            | (Pending, Cancelled)
            | (Pending, Failed)
            | (Confirmed, Completed)
            | (Confirmed, Cancelled)
    )
}

pub fn apply_transition(
    reservation: &mut Reservation,
    to: ReservationStatus,
) -> Result<(), ReservationError> {
    if !transition_allowed(reservation.status, to) {
        return Err(ReservationError::InvalidTransition {
            from: reservation.status,
            to,
        });
    }
    reservation.status = to;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn flight(price: f64) -> FlightDetails {
        FlightDetails {
            external_flight_id: "OFFER-1".to_string(),
            origin: "CDG".to_string(),
            destination: "RAK".to_string(),
            departure_date: NaiveDate::from_ymd_opt(2026, 2, 15).unwrap(),
            return_date: None,
            airline: Some("AF".to_string()),
            flight_number: Some("651".to_string()),
            price,
            passengers: Some(1),
            itinerary: None,
        }
    }

    fn hotel(total_price: f64) -> HotelDetails {
        HotelDetails {
            external_hotel_id: "MCRAK001".to_string(),
            hotel_name: "Riad Dar Anika".to_string(),
            city: "Marrakech".to_string(),
            address: None,
            check_in: NaiveDate::from_ymd_opt(2026, 2, 15).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2026, 2, 18).unwrap(),
            room_count: 1,
            price_per_night: total_price / 3.0,
            total_price,
            nights: Some(3),
            rating: Some(4.5),
            image_url: None,
        }
    }

    #[test]
    fn test_total_price_is_sum_of_present_segments() {
        let user = Uuid::new_v4();
        let reservation = build_reservation(
            user,
            "traveler@example.com",
            ReservationType::Both,
            Some(flight(500.0)),
            Some(hotel(300.0)),
        )
        .unwrap();

        assert_eq!(reservation.total_price, 800.0);
        assert_eq!(reservation.status, ReservationStatus::Pending);
        assert_eq!(reservation.user_id, user);
    }

    #[test]
    fn test_single_segment_reservations() {
        let flight_only = build_reservation(
            Uuid::new_v4(),
            "traveler@example.com",
            ReservationType::Flight,
            Some(flight(420.0)),
            None,
        )
        .unwrap();
        assert_eq!(flight_only.total_price, 420.0);

        let hotel_only = build_reservation(
            Uuid::new_v4(),
            "traveler@example.com",
            ReservationType::Hotel,
            None,
            Some(hotel(270.0)),
        )
        .unwrap();
        assert_eq!(hotel_only.total_price, 270.0);
    }

    #[test]
    fn test_empty_reservation_is_rejected() {
        let result = build_reservation(
            Uuid::new_v4(),
            "traveler@example.com",
            ReservationType::Both,
            None,
            None,
        );
        assert!(matches!(result, Err(ReservationError::MissingSegments)));
    }

    #[test]
    fn test_status_lifecycle() {
        let mut reservation = build_reservation(
            Uuid::new_v4(),
            "traveler@example.com",
            ReservationType::Flight,
            Some(flight(100.0)),
            None,
        )
        .unwrap();

        apply_transition(&mut reservation, ReservationStatus::Confirmed).unwrap();
        apply_transition(&mut reservation, ReservationStatus::Completed).unwrap();
        assert_eq!(reservation.status, ReservationStatus::Completed);
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        assert!(!transition_allowed(
            ReservationStatus::Cancelled,
            ReservationStatus::Confirmed
        ));
        assert!(!transition_allowed(
            ReservationStatus::Pending,
            ReservationStatus::Completed
        ));
        assert!(!transition_allowed(
            ReservationStatus::Failed,
            ReservationStatus::Pending
        ));

        let mut reservation = build_reservation(
            Uuid::new_v4(),
            "traveler@example.com",
            ReservationType::Flight,
            Some(flight(100.0)),
            None,
        )
        .unwrap();
        apply_transition(&mut reservation, ReservationStatus::Cancelled).unwrap();

        let result = apply_transition(&mut reservation, ReservationStatus::Confirmed);
        assert!(matches!(
            result,
            Err(ReservationError::InvalidTransition { .. })
        ));
    }
}
