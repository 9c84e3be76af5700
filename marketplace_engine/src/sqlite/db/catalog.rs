use sqlx::SqliteConnection;

use crate::{
    db_types::{NewProvider, NewServiceCatalogEntry, NewUser, Provider, ServiceCatalogEntry, User},
    traits::CatalogApiError,
};

//--------------------------------------        Users         -------------------------------------------------------
pub(crate) async fn insert_user(user: &NewUser, conn: &mut SqliteConnection) -> Result<User, CatalogApiError> {
    let user = sqlx::query_as("INSERT INTO users (name, email) VALUES ($1, $2) RETURNING *")
        .bind(user.name.clone())
        .bind(user.email.clone())
        .fetch_one(conn)
        .await?;
    Ok(user)
}

pub(crate) async fn fetch_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await
}

pub(crate) async fn delete_user(user_id: i64, conn: &mut SqliteConnection) -> Result<bool, CatalogApiError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(user_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

//--------------------------------------      Providers       -------------------------------------------------------
pub(crate) async fn insert_provider(
    provider: &NewProvider,
    conn: &mut SqliteConnection,
) -> Result<Provider, CatalogApiError> {
    let provider = sqlx::query_as("INSERT INTO providers (name, email) VALUES ($1, $2) RETURNING *")
        .bind(provider.name.clone())
        .bind(provider.email.clone())
        .fetch_one(conn)
        .await?;
    Ok(provider)
}

pub(crate) async fn fetch_provider(
    provider_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Provider>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM providers WHERE id = $1").bind(provider_id).fetch_optional(conn).await
}

pub(crate) async fn delete_provider(provider_id: i64, conn: &mut SqliteConnection) -> Result<bool, CatalogApiError> {
    let result = sqlx::query("DELETE FROM providers WHERE id = $1").bind(provider_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

//--------------------------------------       Services       -------------------------------------------------------
pub(crate) async fn insert_service(
    entry: &NewServiceCatalogEntry,
    conn: &mut SqliteConnection,
) -> Result<ServiceCatalogEntry, CatalogApiError> {
    let entry = sqlx::query_as(
        "INSERT INTO services (provider_id, name, description, cost) VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(entry.provider_id)
    .bind(entry.name.clone())
    .bind(entry.description.clone())
    .bind(entry.cost)
    .fetch_one(conn)
    .await?;
    Ok(entry)
}

pub(crate) async fn fetch_service(
    service_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<ServiceCatalogEntry>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM services WHERE id = $1").bind(service_id).fetch_optional(conn).await
}

pub(crate) async fn delete_service(service_id: i64, conn: &mut SqliteConnection) -> Result<bool, CatalogApiError> {
    let result = sqlx::query("DELETE FROM services WHERE id = $1").bind(service_id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
