//! Shared scaffolding for the engine integration tests: a throwaway migrated database, seeded entities, and a
//! scripted payment gateway.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use log::*;
use marketplace_engine::{
    db_types::{NewProvider, NewServiceCatalogEntry, NewUser, Provider, ServiceCatalogEntry, User},
    traits::{PaymentGateway, PaymentGatewayApiError, PaymentIntent},
    CatalogApi,
    SqliteDatabase,
};
use smp_common::{Rupees, Secret};
use sqlx::{migrate::MigrateDatabase, Sqlite};

/// Creates a fresh, fully migrated database under the system temp directory.
pub async fn new_test_db() -> SqliteDatabase {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = random_db_path();
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("Error dropping database {url}: {e:?}");
    }
    Sqlite::create_database(&url).await.expect("Error creating database");
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
    db.run_migrations().await.expect("Error running DB migrations");
    debug!("🚀️ Test database ready at {url}");
    db
}

fn random_db_path() -> String {
    let dir = std::env::temp_dir();
    format!("sqlite://{}/smp_test_store_{}.db", dir.display(), rand::random::<u64>())
}

pub async fn seed_user(db: &SqliteDatabase) -> User {
    let api = CatalogApi::new(db.clone());
    let tag: u64 = rand::random();
    api.create_user(NewUser { name: "Priya Requester".to_string(), email: format!("priya-{tag:x}@example.com") })
        .await
        .expect("Error creating user")
}

pub async fn seed_provider(db: &SqliteDatabase) -> Provider {
    let api = CatalogApi::new(db.clone());
    let tag: u64 = rand::random();
    api.create_provider(NewProvider {
        name: "Sharma Plumbing".to_string(),
        email: format!("sharma-{tag:x}@example.com"),
    })
    .await
    .expect("Error creating provider")
}

pub async fn seed_service(db: &SqliteDatabase, provider_id: i64) -> ServiceCatalogEntry {
    let api = CatalogApi::new(db.clone());
    api.create_service(NewServiceCatalogEntry::new(provider_id, "Tap installation", Rupees::from(499)))
        .await
        .expect("Error creating service")
}

//--------------------------------------     FakeGateway      -------------------------------------------------------
/// A payment gateway that hands out scripted intents and records how it was called.
#[derive(Clone, Default)]
pub struct FakeGateway {
    state: Arc<Mutex<FakeGatewayState>>,
}

#[derive(Default)]
struct FakeGatewayState {
    confirm_status: Option<String>,
    fail_with: Option<PaymentGatewayApiError>,
    create_calls: u32,
    confirm_calls: u32,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `confirm_intent` call will report this status until changed. Clears any scripted failure.
    pub fn report_status<S: Into<String>>(&self, status: S) {
        let mut state = self.state.lock().unwrap();
        state.confirm_status = Some(status.into());
        state.fail_with = None;
    }

    /// Every gateway call will fail with the given error until cleared with [`FakeGateway::report_status`].
    pub fn fail_with(&self, err: PaymentGatewayApiError) {
        let mut state = self.state.lock().unwrap();
        state.fail_with = Some(err);
    }

    pub fn create_calls(&self) -> u32 {
        self.state.lock().unwrap().create_calls
    }

    pub fn confirm_calls(&self) -> u32 {
        self.state.lock().unwrap().confirm_calls
    }
}

impl PaymentGateway for FakeGateway {
    async fn create_intent(&self, _amount: smp_common::Paise, order_id: &marketplace_engine::db_types::OrderId) -> Result<PaymentIntent, PaymentGatewayApiError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = &state.fail_with {
            return Err(err.clone());
        }
        state.create_calls += 1;
        let intent_id = format!("pi_fake_{}_{}", order_id.as_str(), state.create_calls);
        Ok(PaymentIntent {
            intent_id: intent_id.clone(),
            client_secret: Secret::new(format!("{intent_id}_secret")),
            status: "requires_payment_method".to_string(),
        })
    }

    async fn confirm_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentGatewayApiError> {
        let mut state = self.state.lock().unwrap();
        if let Some(err) = &state.fail_with {
            return Err(err.clone());
        }
        state.confirm_calls += 1;
        let status = state.confirm_status.clone().unwrap_or_else(|| "requires_payment_method".to_string());
        Ok(PaymentIntent {
            intent_id: intent_id.to_string(),
            client_secret: Secret::new(format!("{intent_id}_secret")),
            status,
        })
    }
}
