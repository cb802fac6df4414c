use std::sync::Arc;

use voyage_booking::PaymentBridge;
use voyage_core::repository::{DestinationStore, PaymentStore, ReservationStore};
use voyage_provider::amadeus::AmadeusClient;
use voyage_provider::booking::BookingComClient;
use voyage_provider::ProviderRouter;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub amadeus: Arc<AmadeusClient>,
    pub booking: Arc<BookingComClient>,
    pub provider_router: Arc<ProviderRouter>,
    pub reservations: Arc<dyn ReservationStore>,
    pub payments: Arc<dyn PaymentStore>,
    pub destinations: Arc<dyn DestinationStore>,
    pub payment_bridge: Arc<PaymentBridge>,
    pub auth: AuthConfig,
}
