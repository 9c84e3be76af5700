//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Handlers are generic over the backend and gateway traits so the endpoint tests can drive them against mocks;
//! [`configure_api`] registers the full route table for any concrete pair of implementations.
use actix_web::{web, HttpResponse, Responder};
use log::*;
use marketplace_engine::{
    db_types::{NewFeedback, NewOrder, NewProvider, NewServiceCatalogEntry, NewUser, OrderId},
    traits::{CatalogManagement, FeedbackManagement, OrderManagement, PaymentGateway},
    CatalogApi,
    OrderFlowApi,
    RatingApi,
};

use crate::{
    data_objects::{ConfirmPaymentParams, JsonResponse, PaymentInitResult, UpdateStatusParams},
    errors::ServerError,
};

/// Registers every route of the marketplace API under `/api`, for the given backend and gateway implementations.
pub fn configure_api<B, G>(cfg: &mut web::ServiceConfig)
where
    B: OrderManagement + FeedbackManagement + CatalogManagement + 'static,
    G: PaymentGateway + 'static,
{
    cfg.service(
        web::scope("/api")
            .service(
                web::resource("/orders")
                    .route(web::get().to(get_orders::<B, G>))
                    .route(web::post().to(create_order::<B, G>)),
            )
            .service(web::resource("/orders/user/{user_id}").route(web::get().to(orders_for_user::<B, G>)))
            .service(
                web::resource("/orders/provider/{provider_id}").route(web::get().to(orders_for_provider::<B, G>)),
            )
            .service(
                web::resource("/orders/{order_id}/payment/initiate")
                    .route(web::post().to(initiate_payment::<B, G>)),
            )
            .service(
                web::resource("/orders/{order_id}/payment/confirm").route(web::post().to(confirm_payment::<B, G>)),
            )
            .service(web::resource("/orders/{order_id}/status").route(web::put().to(update_order_status::<B, G>)))
            .service(
                web::resource("/orders/{order_id}")
                    .route(web::get().to(get_order::<B, G>))
                    .route(web::delete().to(delete_order::<B, G>)),
            )
            .service(web::resource("/feedback").route(web::post().to(create_feedback::<B>)))
            .service(web::resource("/feedback/service/{service_id}").route(web::get().to(feedback_for_service::<B>)))
            .service(web::resource("/users").route(web::post().to(create_user::<B>)))
            .service(
                web::resource("/users/{user_id}")
                    .route(web::get().to(get_user::<B>))
                    .route(web::delete().to(delete_user::<B>)),
            )
            .service(web::resource("/providers").route(web::post().to(create_provider::<B>)))
            .service(
                web::resource("/providers/{provider_id}")
                    .route(web::get().to(get_provider::<B>))
                    .route(web::delete().to(delete_provider::<B>)),
            )
            .service(web::resource("/services").route(web::post().to(create_service::<B>)))
            .service(
                web::resource("/services/{service_id}")
                    .route(web::get().to(get_service::<B>))
                    .route(web::delete().to(delete_service::<B>)),
            ),
    );
}

// ----------------------------------------------   Health  ----------------------------------------------------

#[actix_web::get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

// ----------------------------------------------   Orders  ----------------------------------------------------

pub async fn create_order<B, G>(
    api: web::Data<OrderFlowApi<B, G>>,
    body: web::Json<NewOrder>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CatalogManagement,
    G: PaymentGateway,
{
    let order = body.into_inner();
    debug!("💻️ POST order for user {} and provider {}", order.user_id, order.provider_id);
    let created = api.create_order(order).await?;
    Ok(HttpResponse::Created().json(created))
}

pub async fn get_orders<B, G>(api: web::Data<OrderFlowApi<B, G>>) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CatalogManagement,
    G: PaymentGateway,
{
    let orders = api.all_orders().await?;
    Ok(HttpResponse::Ok().json(orders))
}

pub async fn get_order<B, G>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CatalogManagement,
    G: PaymentGateway,
{
    let order_id = OrderId::from(path.into_inner());
    debug!("💻️ GET order {order_id}");
    let order = api
        .fetch_order(&order_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id} not found")))?;
    Ok(HttpResponse::Ok().json(order))
}

pub async fn delete_order<B, G>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CatalogManagement,
    G: PaymentGateway,
{
    let order_id = OrderId::from(path.into_inner());
    debug!("💻️ DELETE order {order_id}");
    if api.delete_order(&order_id).await? {
        Ok(HttpResponse::Ok().json(JsonResponse::success("Order deleted successfully")))
    } else {
        Err(ServerError::NoRecordFound(format!("Order {order_id} not found")))
    }
}

pub async fn orders_for_user<B, G>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CatalogManagement,
    G: PaymentGateway,
{
    let user_id = path.into_inner();
    debug!("💻️ GET orders for user {user_id}");
    let orders = api.orders_for_user(user_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

pub async fn orders_for_provider<B, G>(
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CatalogManagement,
    G: PaymentGateway,
{
    let provider_id = path.into_inner();
    debug!("💻️ GET orders for provider {provider_id}");
    let orders = api.orders_for_provider(provider_id).await?;
    Ok(HttpResponse::Ok().json(orders))
}

// ----------------------------------------------  Payments  ----------------------------------------------------

pub async fn initiate_payment<B, G>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CatalogManagement,
    G: PaymentGateway,
{
    let order_id = OrderId::from(path.into_inner());
    debug!("💻️ POST initiate payment for order {order_id}");
    let initiation = api.initiate_payment(&order_id).await?;
    Ok(HttpResponse::Ok().json(PaymentInitResult::from(initiation)))
}

pub async fn confirm_payment<B, G>(
    path: web::Path<String>,
    body: web::Json<ConfirmPaymentParams>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CatalogManagement,
    G: PaymentGateway,
{
    let order_id = OrderId::from(path.into_inner());
    debug!("💻️ POST confirm payment for order {order_id}");
    let updated = api.confirm_payment(&order_id, &body.payment_intent_id).await?;
    Ok(HttpResponse::Ok().json(updated))
}

pub async fn update_order_status<B, G>(
    path: web::Path<String>,
    body: web::Json<UpdateStatusParams>,
    api: web::Data<OrderFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement + CatalogManagement,
    G: PaymentGateway,
{
    let order_id = OrderId::from(path.into_inner());
    debug!("💻️ PUT order {order_id} status to {}", body.status);
    let updated = api.update_order_status(&order_id, body.status).await?;
    Ok(HttpResponse::Ok().json(updated))
}

// ----------------------------------------------  Feedback  ----------------------------------------------------

pub async fn create_feedback<B>(
    api: web::Data<RatingApi<B>>,
    body: web::Json<NewFeedback>,
) -> Result<HttpResponse, ServerError>
where
    B: FeedbackManagement + CatalogManagement,
{
    let feedback = body.into_inner();
    debug!("💻️ POST feedback for service {} by user {}", feedback.service_id, feedback.user_id);
    let saved = api.record_feedback(feedback).await?;
    Ok(HttpResponse::Created().json(saved))
}

pub async fn feedback_for_service<B>(
    path: web::Path<i64>,
    api: web::Data<RatingApi<B>>,
) -> Result<HttpResponse, ServerError>
where
    B: FeedbackManagement + CatalogManagement,
{
    let service_id = path.into_inner();
    debug!("💻️ GET feedback for service {service_id}");
    let feedback = api.feedback_for_service(service_id).await?;
    Ok(HttpResponse::Ok().json(feedback))
}

// ----------------------------------------------   Users  ----------------------------------------------------

pub async fn create_user<B>(api: web::Data<CatalogApi<B>>, body: web::Json<NewUser>) -> Result<HttpResponse, ServerError>
where B: CatalogManagement {
    let created = api.create_user(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

pub async fn get_user<B>(path: web::Path<i64>, api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError>
where B: CatalogManagement {
    let user_id = path.into_inner();
    let user = api
        .user_by_id(user_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("User {user_id} not found")))?;
    Ok(HttpResponse::Ok().json(user))
}

pub async fn delete_user<B>(path: web::Path<i64>, api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError>
where B: CatalogManagement {
    let user_id = path.into_inner();
    if api.delete_user(user_id).await? {
        Ok(HttpResponse::Ok().json(JsonResponse::success("User deleted successfully")))
    } else {
        Err(ServerError::NoRecordFound(format!("User {user_id} not found")))
    }
}

// ----------------------------------------------  Providers  ----------------------------------------------------

pub async fn create_provider<B>(
    api: web::Data<CatalogApi<B>>,
    body: web::Json<NewProvider>,
) -> Result<HttpResponse, ServerError>
where B: CatalogManagement {
    let created = api.create_provider(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

pub async fn get_provider<B>(path: web::Path<i64>, api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError>
where B: CatalogManagement {
    let provider_id = path.into_inner();
    let provider = api
        .provider_by_id(provider_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Provider {provider_id} not found")))?;
    Ok(HttpResponse::Ok().json(provider))
}

pub async fn delete_provider<B>(
    path: web::Path<i64>,
    api: web::Data<CatalogApi<B>>,
) -> Result<HttpResponse, ServerError>
where B: CatalogManagement {
    let provider_id = path.into_inner();
    if api.delete_provider(provider_id).await? {
        Ok(HttpResponse::Ok().json(JsonResponse::success("Provider deleted successfully")))
    } else {
        Err(ServerError::NoRecordFound(format!("Provider {provider_id} not found")))
    }
}

// ----------------------------------------------  Services  ----------------------------------------------------

pub async fn create_service<B>(
    api: web::Data<CatalogApi<B>>,
    body: web::Json<NewServiceCatalogEntry>,
) -> Result<HttpResponse, ServerError>
where B: CatalogManagement {
    let created = api.create_service(body.into_inner()).await?;
    Ok(HttpResponse::Created().json(created))
}

pub async fn get_service<B>(path: web::Path<i64>, api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError>
where B: CatalogManagement {
    let service_id = path.into_inner();
    let entry = api
        .service_by_id(service_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Service {service_id} not found")))?;
    Ok(HttpResponse::Ok().json(entry))
}

pub async fn delete_service<B>(path: web::Path<i64>, api: web::Data<CatalogApi<B>>) -> Result<HttpResponse, ServerError>
where B: CatalogManagement {
    let service_id = path.into_inner();
    if api.delete_service(service_id).await? {
        Ok(HttpResponse::Ok().json(JsonResponse::success("Service deleted successfully")))
    } else {
        Err(ServerError::NoRecordFound(format!("Service {service_id} not found")))
    }
}
