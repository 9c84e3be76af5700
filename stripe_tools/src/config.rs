use std::{env, time::Duration};

use log::*;
use smp_common::Secret;

const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com";
const DEFAULT_STRIPE_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone, Debug)]
pub struct StripeConfig {
    /// Base URL of the payment processor API. Overridable so tests can point the client at a local stand-in.
    pub api_url: String,
    pub secret_key: Secret<String>,
    /// Hard deadline on every processor call. Expiry is reported as a timeout error, never swallowed.
    pub timeout: Duration,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_STRIPE_API_URL.to_string(),
            secret_key: Secret::new(String::default()),
            timeout: DEFAULT_STRIPE_TIMEOUT,
        }
    }
}

impl StripeConfig {
    pub fn new(api_url: &str, secret_key: &str) -> Self {
        Self {
            api_url: api_url.to_string(),
            secret_key: Secret::new(secret_key.to_string()),
            ..Default::default()
        }
    }

    pub fn from_env_or_default() -> Self {
        let api_url = env::var("STRIPE_API_URL").ok().unwrap_or_else(|| DEFAULT_STRIPE_API_URL.into());
        let secret_key = env::var("STRIPE_SECRET_KEY").map(Secret::new).unwrap_or_else(|_| {
            error!("🪛️ STRIPE_SECRET_KEY is not set. Payment calls will be rejected by the processor.");
            Secret::new(String::default())
        });
        let timeout = env::var("STRIPE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_STRIPE_TIMEOUT);
        Self { api_url, secret_key, timeout }
    }
}
