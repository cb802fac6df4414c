pub mod payments;
pub mod reservations;

pub use payments::{PaymentBridge, PaymentError};
pub use reservations::{build_reservation, transition_allowed, ReservationError};
