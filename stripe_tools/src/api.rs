use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
    StatusCode,
};
use serde::de::DeserializeOwned;
use smp_common::{Paise, INR_CURRENCY_CODE_LOWER};

use crate::{
    config::StripeConfig,
    data_objects::{ApiErrorEnvelope, PaymentIntentResource},
    StripeApiError,
};

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(2);
        let bearer = format!("Bearer {}", config.secret_key.reveal());
        let mut val =
            HeaderValue::from_str(&bearer).map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/x-www-form-urlencoded"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/v1{path}", self.config.api_url.trim_end_matches('/'))
    }

    /// Opens a new payment intent over `amount`, tagged with the order it pays for.
    pub async fn create_payment_intent(
        &self,
        amount: Paise,
        order_reference: &str,
    ) -> Result<PaymentIntentResource, StripeApiError> {
        debug!("Creating payment intent of {amount} for order {order_reference}");
        let params = [
            ("amount", amount.value().to_string()),
            ("currency", INR_CURRENCY_CODE_LOWER.to_string()),
            ("metadata[order_id]", order_reference.to_string()),
        ];
        let req = self.client.post(self.url("/payment_intents")).form(&params);
        let intent: PaymentIntentResource = self.send(req).await?;
        info!("Payment intent [{}] created for order {order_reference}", intent.id);
        Ok(intent)
    }

    /// Queries the current state of a payment intent.
    pub async fn retrieve_payment_intent(&self, intent_id: &str) -> Result<PaymentIntentResource, StripeApiError> {
        trace!("Fetching payment intent [{intent_id}]");
        let path = format!("/payment_intents/{intent_id}");
        let req = self.client.get(self.url(&path));
        match self.send::<PaymentIntentResource>(req).await {
            Err(StripeApiError::QueryError { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Err(StripeApiError::IntentNotFound(intent_id.to_string()))
            },
            other => other,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T, StripeApiError> {
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                StripeApiError::Timeout(e.to_string())
            } else {
                StripeApiError::RequestError(e.to_string())
            }
        })?;
        if response.status().is_success() {
            trace!("Processor query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| StripeApiError::RequestError(e.to_string()))?;
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or(body);
            Err(StripeApiError::QueryError { status, message })
        }
    }
}
