//! A narrow client for the payment processor's REST API.
//!
//! Only the two calls the order flow needs are implemented: creating a payment intent, and querying one. Webhook
//! handling, refunds and the rest of the processor surface are deliberately absent.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::StripeApi;
pub use config::StripeConfig;
pub use data_objects::PaymentIntentResource;
pub use error::StripeApiError;
