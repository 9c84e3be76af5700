use smp_common::{Paise, Secret};
use thiserror::Error;

use crate::db_types::OrderId;

/// The status string the payment processor reports for a fully settled intent.
pub const INTENT_STATUS_SUCCEEDED: &str = "succeeded";

/// Whether the given intent status means the charge attempt is still in progress and the intent can be offered to
/// the client again instead of creating a duplicate.
pub fn intent_is_pending(status: &str) -> bool {
    matches!(status, "requires_payment_method" | "requires_confirmation" | "requires_action" | "processing")
}

//--------------------------------------    PaymentIntent     -------------------------------------------------------
/// The payment processor's handle for an in-progress charge attempt.
///
/// Only the intent id is ever persisted; the client secret goes straight back to the caller.
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub intent_id: String,
    pub client_secret: Secret<String>,
    /// The processor's status string, verbatim. Compared against [`INTENT_STATUS_SUCCEEDED`] at confirmation.
    pub status: String,
}

//--------------------------------------    PaymentGateway    -------------------------------------------------------
/// The narrow contract the order flow has with the external payment processor.
///
/// Both calls are blocking I/O from the engine's point of view and must never be held inside a database
/// transaction. Implementations signal transport or processor failure through [`PaymentGatewayApiError`]; a
/// non-success intent status is data, not an error.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    /// Ask the processor to create a payment intent over `amount`, tagged with the order it pays for.
    async fn create_intent(&self, amount: Paise, order_id: &OrderId) -> Result<PaymentIntent, PaymentGatewayApiError>;

    /// Query the processor for the current settlement status of an intent.
    async fn confirm_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentGatewayApiError>;
}

#[derive(Debug, Clone, Error)]
pub enum PaymentGatewayApiError {
    #[error("Could not reach the payment processor. {0}")]
    Transport(String),
    #[error("The payment processor did not respond within the deadline. {0}")]
    Timeout(String),
    #[error("The payment processor rejected the request. Error {status}. {message}")]
    Rejected { status: u16, message: String },
    #[error("Could not interpret the payment processor response. {0}")]
    InvalidResponse(String),
    #[error("The payment intent {0} does not exist at the processor")]
    IntentNotFound(String),
}
