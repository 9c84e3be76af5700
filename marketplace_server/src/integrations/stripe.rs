//! Adapts the payment processor REST client to the engine's [`PaymentGateway`] contract.
use log::*;
use marketplace_engine::{
    db_types::OrderId,
    traits::{PaymentGateway, PaymentGatewayApiError, PaymentIntent},
};
use smp_common::{Paise, Secret};
use stripe_tools::{PaymentIntentResource, StripeApi, StripeApiError, StripeConfig};

#[derive(Clone)]
pub struct StripeGateway {
    api: StripeApi,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let api = StripeApi::new(config)?;
        Ok(Self { api })
    }
}

impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, amount: Paise, order_id: &OrderId) -> Result<PaymentIntent, PaymentGatewayApiError> {
        let resource = self.api.create_payment_intent(amount, order_id.as_str()).await.map_err(map_stripe_error)?;
        let secret = resource.client_secret.clone().ok_or_else(|| {
            PaymentGatewayApiError::InvalidResponse(format!(
                "Processor returned intent {} without a client secret",
                resource.id
            ))
        })?;
        debug!("💳️ Intent [{}] created for order {order_id}", resource.id);
        Ok(to_payment_intent(resource, secret))
    }

    async fn confirm_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentGatewayApiError> {
        let resource = self.api.retrieve_payment_intent(intent_id).await.map_err(map_stripe_error)?;
        trace!("💳️ Intent [{}] is {}", resource.id, resource.status);
        let secret = resource.client_secret.clone().unwrap_or_default();
        Ok(to_payment_intent(resource, secret))
    }
}

fn to_payment_intent(resource: PaymentIntentResource, secret: String) -> PaymentIntent {
    PaymentIntent { intent_id: resource.id, client_secret: Secret::new(secret), status: resource.status }
}

fn map_stripe_error(e: StripeApiError) -> PaymentGatewayApiError {
    match e {
        StripeApiError::Initialization(msg) => PaymentGatewayApiError::Transport(msg),
        StripeApiError::RequestError(msg) => PaymentGatewayApiError::Transport(msg),
        StripeApiError::Timeout(msg) => PaymentGatewayApiError::Timeout(msg),
        StripeApiError::JsonError(msg) => PaymentGatewayApiError::InvalidResponse(msg),
        StripeApiError::QueryError { status, message } => PaymentGatewayApiError::Rejected { status, message },
        StripeApiError::IntentNotFound(id) => PaymentGatewayApiError::IntentNotFound(id),
    }
}
