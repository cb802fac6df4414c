use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use voyage_api::{app, state::{AppState, AuthConfig}};
use voyage_booking::PaymentBridge;
use voyage_core::repository::{DestinationStore, PaymentStore, ReservationStore};
use voyage_provider::amadeus::{AmadeusAuth, AmadeusClient, AmadeusConfig};
use voyage_provider::booking::{BookingComClient, RapidApiConfig};
use voyage_provider::stripe::{StripeConfig, StripeGateway};
use voyage_provider::{ProviderRouter, ProviderTables, TokenCache};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "voyage_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = voyage_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Voyage API on port {}", config.server.port);

    let db = voyage_store::DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");

    // One HTTP client with fixed timeouts for every outbound provider call
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http.timeout_seconds))
        .connect_timeout(Duration::from_secs(config.http.connect_timeout_seconds))
        .build()
        .expect("Failed to build HTTP client");

    let tables = Arc::new(ProviderTables::builtin());

    let amadeus_auth = AmadeusAuth::new(
        http.clone(),
        AmadeusConfig {
            api_key: config.amadeus.api_key.clone(),
            api_secret: config.amadeus.api_secret.clone(),
            auth_url: config.amadeus.auth_url.clone(),
            base_url: config.amadeus.base_url.clone(),
        },
    );
    let tokens = Arc::new(TokenCache::new(Arc::new(amadeus_auth)));
    let amadeus = Arc::new(AmadeusClient::new(
        http.clone(),
        config.amadeus.base_url.clone(),
        tokens,
    ));

    let booking = Arc::new(BookingComClient::new(
        http.clone(),
        RapidApiConfig {
            key: config.rapidapi.key.clone(),
            host: config.rapidapi.host.clone(),
            base_url: config.rapidapi.base_url.clone(),
        },
        tables.clone(),
    ));

    let gateway = Arc::new(StripeGateway::new(
        http,
        StripeConfig {
            secret_key: config.stripe.secret_key.clone(),
            base_url: config.stripe.base_url.clone(),
        },
    ));

    let reservations: Arc<dyn ReservationStore> =
        Arc::new(voyage_store::StoreReservationRepository::new(db.pool.clone()));
    let payments: Arc<dyn PaymentStore> =
        Arc::new(voyage_store::StorePaymentRepository::new(db.pool.clone()));
    let destinations: Arc<dyn DestinationStore> =
        Arc::new(voyage_store::StoreCatalogRepository::new(db.pool.clone()));

    let state = AppState {
        amadeus,
        booking,
        provider_router: Arc::new(ProviderRouter::new(tables)),
        reservations,
        payments: payments.clone(),
        destinations,
        payment_bridge: Arc::new(PaymentBridge::new(gateway, payments)),
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
    };

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
