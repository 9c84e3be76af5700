use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use marketplace_engine::traits::{CatalogApiError, OrderFlowError, RatingApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Operation not permitted. {0}")]
    InvalidOrderState(String),
    #[error("Payment not successful. Status: {0}")]
    PaymentNotSuccessful(String),
    #[error("Payment gateway failure. {0}")]
    PaymentGatewayFailure(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::InvalidOrderState(_) => StatusCode::BAD_REQUEST,
            Self::PaymentNotSuccessful(_) => StatusCode::BAD_REQUEST,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PaymentGatewayFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = serde_json::json!({
            "status": status.as_u16(),
            "error": status.canonical_reason().unwrap_or("Unknown"),
            "message": self.to_string(),
        });
        HttpResponse::build(status).insert_header(ContentType::json()).body(body.to_string())
    }
}

impl From<OrderFlowError> for ServerError {
    fn from(e: OrderFlowError) -> Self {
        match e {
            OrderFlowError::ValidationError(msg) => Self::ValidationError(msg),
            OrderFlowError::OrderNotFound(oid) => Self::NoRecordFound(format!("Order {oid} not found")),
            OrderFlowError::UserNotFound(id) => Self::NoRecordFound(format!("User {id} not found")),
            OrderFlowError::ProviderNotFound(id) => Self::NoRecordFound(format!("Provider {id} not found")),
            OrderFlowError::InvalidState(oid, status) => {
                Self::InvalidOrderState(format!("Cannot initiate payment for order {oid} while it is {status}"))
            },
            OrderFlowError::PaymentNotSuccessful(status) => Self::PaymentNotSuccessful(status),
            OrderFlowError::GatewayError(ge) => {
                error!("💻️ Payment gateway failure; the order may need reconciliation. {ge}");
                Self::PaymentGatewayFailure(ge.to_string())
            },
            OrderFlowError::DatabaseError(msg) => Self::BackendError(msg),
        }
    }
}

impl From<RatingApiError> for ServerError {
    fn from(e: RatingApiError) -> Self {
        match e {
            RatingApiError::ValidationError(msg) => Self::ValidationError(msg),
            RatingApiError::ServiceNotFound(id) => Self::NoRecordFound(format!("Service {id} not found")),
            RatingApiError::Consistency(msg) => {
                error!("💻️ Rating aggregates need reconciliation. {msg}");
                Self::BackendError(msg)
            },
            RatingApiError::UpdateConflict(id) => {
                error!("💻️ Rating aggregates for service {id} could not be updated; reconciliation required.");
                Self::BackendError(format!("Rating aggregates for service {id} could not be updated"))
            },
            RatingApiError::DatabaseError(msg) => Self::BackendError(msg),
        }
    }
}

impl From<CatalogApiError> for ServerError {
    fn from(e: CatalogApiError) -> Self {
        match e {
            CatalogApiError::ValidationError(msg) => Self::ValidationError(msg),
            CatalogApiError::NotFound(msg) => Self::NoRecordFound(msg),
            CatalogApiError::DatabaseError(msg) => Self::BackendError(msg),
        }
    }
}
