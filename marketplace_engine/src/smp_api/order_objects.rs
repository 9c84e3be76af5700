use serde::{Deserialize, Serialize};
use smp_common::{Paise, Rupees, Secret};

use crate::db_types::{LineItem, Order};

/// An order together with its line items, as returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResult {
    #[serde(flatten)]
    pub order: Order,
    pub line_items: Vec<LineItem>,
}

/// Everything the client needs to complete a payment it has just initiated.
///
/// The client secret is handed back to the caller exactly once and is never persisted.
#[derive(Debug, Clone)]
pub struct PaymentInitiation {
    pub client_secret: Secret<String>,
    /// The order total, rounded to whole paise.
    pub amount_in_rupees: Rupees,
    /// The same amount in the integer minor units the payment processor was charged with.
    pub amount_in_paise: Paise,
    pub currency: String,
}
