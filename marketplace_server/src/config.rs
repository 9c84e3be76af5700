use std::env;

use log::*;
use smp_common::helpers::parse_boolean_flag;
use stripe_tools::StripeConfig;

const DEFAULT_SMP_HOST: &str = "127.0.0.1";
const DEFAULT_SMP_PORT: u16 = 8360;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// When true, pending schema migrations run at startup before the first request is served.
    pub migrate_on_startup: bool,
    /// Payment processor credentials and endpoint.
    pub stripe_config: StripeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SMP_HOST.to_string(),
            port: DEFAULT_SMP_PORT,
            database_url: String::default(),
            migrate_on_startup: true,
            stripe_config: StripeConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SMP_HOST").ok().unwrap_or_else(|| DEFAULT_SMP_HOST.into());
        let port = env::var("SMP_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SMP_PORT. {e} Using the default, {DEFAULT_SMP_PORT}, instead."
                    );
                    DEFAULT_SMP_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SMP_PORT);
        let database_url = env::var("SMP_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SMP_DATABASE_URL is not set. Please set it to the URL for the marketplace database.");
            String::default()
        });
        let migrate_on_startup = parse_boolean_flag(env::var("SMP_MIGRATE_ON_STARTUP").ok(), true);
        let stripe_config = StripeConfig::from_env_or_default();
        Self { host, port, database_url, migrate_on_startup, stripe_config }
    }
}
