use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use voyage_core::payment::{Payment, PaymentGateway, PaymentStatus};
use voyage_core::repository::PaymentStore;
use voyage_core::reservation::Reservation;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("No payment found for transaction {0}")]
    NotFound(String),

    #[error("Payment provider error: {0}")]
    Gateway(String),

    #[error("Payment storage error: {0}")]
    Store(String),
}

/// Prices are stored in major units; the processor wants integer minor
/// units. Truncates, matching the historical conversion.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0) as i64
}

/// Ties reservations to the external payment processor.
pub struct PaymentBridge {
    gateway: Arc<dyn PaymentGateway>,
    payments: Arc<dyn PaymentStore>,
}

impl PaymentBridge {
    pub fn new(gateway: Arc<dyn PaymentGateway>, payments: Arc<dyn PaymentStore>) -> Self {
        Self { gateway, payments }
    }

    /// Create the payment for a reservation, or return the existing one.
    /// The lookup-before-create keeps repeat calls from opening duplicate
    /// transactions with the processor.
    pub async fn create_intent(&self, reservation: &Reservation) -> Result<Payment, PaymentError> {
        if let Some(existing) = self
            .payments
            .find_by_reservation(reservation.id)
            .await
            .map_err(store_error)?
        {
            tracing::info!(
                reservation_id = %reservation.id,
                intent_id = %existing.intent_id,
                "reusing existing payment intent"
            );
            return Ok(existing);
        }

        let amount_minor = to_minor_units(reservation.total_price);
        let charge = self
            .gateway
            .create_charge(reservation.id, amount_minor, "usd")
            .await
            .map_err(|e| PaymentError::Gateway(e.to_string()))?;

        let payment = Payment {
            id: Uuid::new_v4(),
            reservation_id: reservation.id,
            amount: reservation.total_price,
            intent_id: charge.intent_id,
            client_secret: charge.client_secret,
            status: PaymentStatus::Pending,
            failure_reason: None,
            created_at: Utc::now(),
        };
        self.payments.insert(&payment).await.map_err(store_error)?;

        tracing::info!(
            reservation_id = %reservation.id,
            intent_id = %payment.intent_id,
            "created payment intent"
        );
        Ok(payment)
    }

    /// Confirmation cascades: the payment completes and its reservation is
    /// confirmed in the same unit of work.
    pub async fn confirm(&self, intent_id: &str) -> Result<Payment, PaymentError> {
        let payment = self
            .payments
            .complete_and_confirm(intent_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| PaymentError::NotFound(intent_id.to_string()))?;

        tracing::info!(reservation_id = %payment.reservation_id, intent_id, "payment confirmed");
        Ok(payment)
    }

    /// Failures do not cascade: the payment is marked failed with the
    /// reason, the reservation keeps its status.
    pub async fn fail(&self, intent_id: &str, reason: &str) -> Result<Payment, PaymentError> {
        let payment = self
            .payments
            .mark_failed(intent_id, reason)
            .await
            .map_err(store_error)?
            .ok_or_else(|| PaymentError::NotFound(intent_id.to_string()))?;

        tracing::info!(
            reservation_id = %payment.reservation_id,
            intent_id,
            reason,
            "payment failed"
        );
        Ok(payment)
    }
}

fn store_error(err: voyage_core::repository::StoreError) -> PaymentError {
    PaymentError::Store(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use voyage_core::payment::ProviderCharge;
    use voyage_core::repository::StoreError;
    use voyage_core::reservation::{ReservationStatus, ReservationType};

    struct CountingGateway {
        charges: AtomicUsize,
        last_amount_minor: AtomicI64,
    }

    impl CountingGateway {
        fn new() -> Self {
            Self {
                charges: AtomicUsize::new(0),
                last_amount_minor: AtomicI64::new(0),
            }
        }
    }

    #[async_trait]
    impl PaymentGateway for CountingGateway {
        async fn create_charge(
            &self,
            reservation_id: Uuid,
            amount_minor: i64,
            currency: &str,
        ) -> Result<ProviderCharge, StoreError> {
            self.charges.fetch_add(1, Ordering::SeqCst);
            self.last_amount_minor.store(amount_minor, Ordering::SeqCst);
            Ok(ProviderCharge {
                intent_id: format!("pi_{}", reservation_id.simple()),
                client_secret: Some("secret_test_123".to_string()),
                amount_minor,
                currency: currency.to_string(),
            })
        }
    }

    /// In-memory store backing both payments and their reservations so the
    /// confirm cascade can be observed.
    #[derive(Default)]
    struct MemoryStore {
        inner: Mutex<MemoryInner>,
    }

    #[derive(Default)]
    struct MemoryInner {
        reservations: HashMap<Uuid, Reservation>,
        payments: Vec<Payment>,
    }

    impl MemoryStore {
        fn with_reservation(reservation: Reservation) -> Arc<Self> {
            let store = Self::default();
            store
                .inner
                .lock()
                .unwrap()
                .reservations
                .insert(reservation.id, reservation);
            Arc::new(store)
        }

        fn reservation_status(&self, id: Uuid) -> ReservationStatus {
            self.inner.lock().unwrap().reservations[&id].status
        }
    }

    #[async_trait]
    impl PaymentStore for MemoryStore {
        async fn insert(&self, payment: &Payment) -> Result<(), StoreError> {
            let mut inner = self.inner.lock().unwrap();
            if inner
                .payments
                .iter()
                .any(|p| p.reservation_id == payment.reservation_id)
            {
                return Err("duplicate payment for reservation".into());
            }
            inner.payments.push(payment.clone());
            Ok(())
        }

        async fn find_by_reservation(
            &self,
            reservation_id: Uuid,
        ) -> Result<Option<Payment>, StoreError> {
            Ok(self
                .inner
                .lock()
                .unwrap()
                .payments
                .iter()
                .find(|p| p.reservation_id == reservation_id)
                .cloned())
        }

        async fn find_by_intent(&self, intent_id: &str) -> Result<Option<Payment>, StoreError> {
            Ok(self
                .inner
                .lock()
                .unwrap()
                .payments
                .iter()
                .find(|p| p.intent_id == intent_id)
                .cloned())
        }

        async fn complete_and_confirm(
            &self,
            intent_id: &str,
        ) -> Result<Option<Payment>, StoreError> {
            let mut inner = self.inner.lock().unwrap();
            let Some(payment) = inner.payments.iter_mut().find(|p| p.intent_id == intent_id)
            else {
                return Ok(None);
            };
            payment.status = PaymentStatus::Completed;
            let updated = payment.clone();

            if let Some(reservation) = inner.reservations.get_mut(&updated.reservation_id) {
                if reservation.status == ReservationStatus::Pending {
                    reservation.status = ReservationStatus::Confirmed;
                }
            }
            Ok(Some(updated))
        }

        async fn mark_failed(
            &self,
            intent_id: &str,
            reason: &str,
        ) -> Result<Option<Payment>, StoreError> {
            let mut inner = self.inner.lock().unwrap();
            let Some(payment) = inner.payments.iter_mut().find(|p| p.intent_id == intent_id)
            else {
                return Ok(None);
            };
            payment.status = PaymentStatus::Failed;
            payment.failure_reason = Some(reason.to_string());
            Ok(Some(payment.clone()))
        }
    }

    fn reservation(total_price: f64) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            user_email: "traveler@example.com".to_string(),
            kind: ReservationType::Flight,
            status: ReservationStatus::Pending,
            total_price,
            flight: None,
            hotel: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_minor_unit_conversion_truncates() {
        assert_eq!(to_minor_units(800.0), 80000);
        assert_eq!(to_minor_units(800.50), 80050);
        assert_eq!(to_minor_units(10.999), 1099);
        assert_eq!(to_minor_units(0.0), 0);
    }

    #[tokio::test]
    async fn test_create_intent_is_idempotent() {
        let reservation = reservation(800.50);
        let store = MemoryStore::with_reservation(reservation.clone());
        let gateway = Arc::new(CountingGateway::new());
        let bridge = PaymentBridge::new(gateway.clone(), store);

        let first = bridge.create_intent(&reservation).await.unwrap();
        let second = bridge.create_intent(&reservation).await.unwrap();

        assert_eq!(first.intent_id, second.intent_id);
        assert_eq!(first.id, second.id);
        assert_eq!(gateway.charges.load(Ordering::SeqCst), 1);
        assert_eq!(gateway.last_amount_minor.load(Ordering::SeqCst), 80050);
    }

    #[tokio::test]
    async fn test_confirm_cascades_to_reservation() {
        let reservation = reservation(500.0);
        let store = MemoryStore::with_reservation(reservation.clone());
        let bridge = PaymentBridge::new(Arc::new(CountingGateway::new()), store.clone());

        let payment = bridge.create_intent(&reservation).await.unwrap();
        let confirmed = bridge.confirm(&payment.intent_id).await.unwrap();

        assert_eq!(confirmed.status, PaymentStatus::Completed);
        assert_eq!(
            store.reservation_status(reservation.id),
            ReservationStatus::Confirmed
        );
    }

    #[tokio::test]
    async fn test_confirm_unknown_intent_is_not_found_and_mutates_nothing() {
        let reservation = reservation(500.0);
        let store = MemoryStore::with_reservation(reservation.clone());
        let bridge = PaymentBridge::new(Arc::new(CountingGateway::new()), store.clone());
        bridge.create_intent(&reservation).await.unwrap();

        let result = bridge.confirm("pi_does_not_exist").await;

        assert!(matches!(result, Err(PaymentError::NotFound(_))));
        assert_eq!(
            store.reservation_status(reservation.id),
            ReservationStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_fail_records_reason_without_touching_reservation() {
        let reservation = reservation(500.0);
        let store = MemoryStore::with_reservation(reservation.clone());
        let bridge = PaymentBridge::new(Arc::new(CountingGateway::new()), store.clone());

        let payment = bridge.create_intent(&reservation).await.unwrap();
        let failed = bridge
            .fail(&payment.intent_id, "card_declined")
            .await
            .unwrap();

        assert_eq!(failed.status, PaymentStatus::Failed);
        assert_eq!(failed.failure_reason.as_deref(), Some("card_declined"));
        assert_eq!(
            store.reservation_status(reservation.id),
            ReservationStatus::Pending
        );
    }
}
