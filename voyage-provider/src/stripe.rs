use async_trait::async_trait;
use uuid::Uuid;

use voyage_core::payment::{PaymentGateway, ProviderCharge};

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub base_url: String,
}

/// Payment-intent creation against the Stripe HTTP API. The intent id and
/// client secret come back for the frontend confirmation flow; webhooks and
/// the confirm/fail endpoints drive the rest of the lifecycle.
pub struct StripeGateway {
    http: reqwest::Client,
    config: StripeConfig,
}

impl StripeGateway {
    pub fn new(http: reqwest::Client, config: StripeConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_charge(
        &self,
        reservation_id: Uuid,
        amount_minor: i64,
        currency: &str,
    ) -> Result<ProviderCharge, Box<dyn std::error::Error + Send + Sync>> {
        let params = [
            ("amount", amount_minor.to_string()),
            ("currency", currency.to_string()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
            ("metadata[reservation_id]", reservation_id.to_string()),
        ];

        let body: wire::PaymentIntent = self
            .http
            .post(format!("{}/v1/payment_intents", self.config.base_url))
            .basic_auth(&self.config.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        tracing::info!(reservation_id = %reservation_id, intent_id = %body.id, "created payment intent");

        Ok(ProviderCharge {
            intent_id: body.id,
            client_secret: body.client_secret,
            amount_minor,
            currency: currency.to_string(),
        })
    }
}

mod wire {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct PaymentIntent {
        pub id: String,
        pub client_secret: Option<String>,
    }
}
