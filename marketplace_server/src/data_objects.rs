use std::fmt::Display;

use serde::{Deserialize, Serialize};
use smp_common::{Paise, Rupees};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// Body of a payment confirmation request: the intent the client believes it has just completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentParams {
    pub payment_intent_id: String,
}

/// Body of a manual status override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusParams {
    pub status: marketplace_engine::db_types::OrderStatus,
}

/// Response to a successful payment initiation. Field names are part of the client contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInitResult {
    pub client_secret: String,
    pub amount_in_rupees: Rupees,
    pub amount_in_paise: Paise,
    pub currency: String,
}

impl From<marketplace_engine::order_objects::PaymentInitiation> for PaymentInitResult {
    fn from(p: marketplace_engine::order_objects::PaymentInitiation) -> Self {
        Self {
            client_secret: p.client_secret.into_inner(),
            amount_in_rupees: p.amount_in_rupees,
            amount_in_paise: p.amount_in_paise,
            currency: p.currency,
        }
    }
}
