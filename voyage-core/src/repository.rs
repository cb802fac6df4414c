use async_trait::async_trait;
use uuid::Uuid;

use crate::payment::Payment;
use crate::reservation::{Reservation, ReservationStatus};

pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Repository trait for reservation persistence
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Persist a reservation and its embedded detail rows atomically.
    async fn create(&self, reservation: &Reservation) -> Result<(), StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Reservation>, StoreError>;

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Reservation>, StoreError>;

    async fn list_all(&self) -> Result<Vec<Reservation>, StoreError>;

    async fn set_status(&self, id: Uuid, status: ReservationStatus) -> Result<(), StoreError>;
}

/// Repository trait for payment persistence. The store enforces the
/// one-payment-per-reservation invariant.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert(&self, payment: &Payment) -> Result<(), StoreError>;

    async fn find_by_reservation(&self, reservation_id: Uuid)
        -> Result<Option<Payment>, StoreError>;

    async fn find_by_intent(&self, intent_id: &str) -> Result<Option<Payment>, StoreError>;

    /// Mark the payment COMPLETED and its reservation CONFIRMED as one
    /// atomic unit. Returns the updated payment, or None when no payment
    /// matches the intent id.
    async fn complete_and_confirm(&self, intent_id: &str)
        -> Result<Option<Payment>, StoreError>;

    /// Mark the payment FAILED and record the reason. The reservation is
    /// left untouched. Returns None when no payment matches.
    async fn mark_failed(&self, intent_id: &str, reason: &str)
        -> Result<Option<Payment>, StoreError>;
}

/// Admin-facing destination catalog.
#[async_trait]
pub trait DestinationStore: Send + Sync {
    async fn create(&self, destination: &crate::reservation::CatalogDestination)
        -> Result<Uuid, StoreError>;

    async fn get(&self, id: Uuid)
        -> Result<Option<crate::reservation::CatalogDestination>, StoreError>;

    async fn list(&self) -> Result<Vec<crate::reservation::CatalogDestination>, StoreError>;

    async fn update(&self, id: Uuid, destination: &crate::reservation::CatalogDestination)
        -> Result<(), StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}
