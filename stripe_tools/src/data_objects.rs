use serde::{Deserialize, Serialize};

/// The subset of the processor's payment-intent resource that the marketplace consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentResource {
    pub id: String,
    /// Absent when the key used for the query is not allowed to see it.
    pub client_secret: Option<String>,
    /// Lifecycle status, verbatim: `requires_payment_method`, `processing`, `succeeded`, `canceled`, ...
    pub status: String,
    /// Amount in minor units.
    pub amount: i64,
    pub currency: String,
}

/// The error envelope the processor wraps failures in.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}
