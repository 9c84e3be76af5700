use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use smp_common::{RatingScore, Rupees};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------        OrderId       -------------------------------------------------------
/// The opaque, public identifier of an order. Generated by the server at order creation; the integer row id is an
/// internal detail and never leaves the database layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------      OrderStatus     -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum OrderStatus {
    /// The order has been created and no payment has been initiated or received.
    Requested,
    /// The payment processor has confirmed settlement of the order total.
    Paid,
    /// The provider has fulfilled the order. Terminal.
    Completed,
    /// The order has been cancelled by the requester or an admin. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Terminal states admit no further lifecycle transition through the guarded payment flow.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Requested => write!(f, "Requested"),
            OrderStatus::Paid => write!(f, "Paid"),
            OrderStatus::Completed => write!(f, "Completed"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Requested" => Ok(Self::Requested),
            "Paid" => Ok(Self::Paid),
            "Completed" => Ok(Self::Completed),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid order status: {value}. But this conversion cannot fail. Defaulting to Requested");
            OrderStatus::Requested
        })
    }
}

//--------------------------------------     PaymentMethod    -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentMethod {
    CreditCard,
    DebitCard,
    BankTransfer,
    Paypal,
    Upi,
    Cash,
    Other,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::CreditCard => write!(f, "CreditCard"),
            PaymentMethod::DebitCard => write!(f, "DebitCard"),
            PaymentMethod::BankTransfer => write!(f, "BankTransfer"),
            PaymentMethod::Paypal => write!(f, "Paypal"),
            PaymentMethod::Upi => write!(f, "Upi"),
            PaymentMethod::Cash => write!(f, "Cash"),
            PaymentMethod::Other => write!(f, "Other"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CreditCard" => Ok(Self::CreditCard),
            "DebitCard" => Ok(Self::DebitCard),
            "BankTransfer" => Ok(Self::BankTransfer),
            "Paypal" => Ok(Self::Paypal),
            "Upi" => Ok(Self::Upi),
            "Cash" => Ok(Self::Cash),
            "Other" => Ok(Self::Other),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------        Order         -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    /// The requester placing the order.
    pub user_id: i64,
    /// The provider expected to fulfil the order.
    pub provider_id: i64,
    pub status: OrderStatus,
    pub total_cost: Rupees,
    /// The payment processor's handle for the in-progress charge attempt, once payment has been initiated.
    /// The associated client secret is never stored.
    pub payment_intent_id: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder       -------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    /// The requester placing the order.
    pub user_id: i64,
    /// The provider expected to fulfil the order.
    pub provider_id: i64,
    /// The total price of the order. Must be greater than zero.
    pub total_cost: Rupees,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub line_items: Vec<NewLineItem>,
}

impl NewOrder {
    pub fn new(user_id: i64, provider_id: i64, total_cost: Rupees) -> Self {
        Self { user_id, provider_id, total_cost, payment_method: None, line_items: Vec::new() }
    }

    pub fn with_line_item(mut self, item: NewLineItem) -> Self {
        self.line_items.push(item);
        self
    }
}

//--------------------------------------       LineItem       -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LineItem {
    pub id: i64,
    pub order_id: i64,
    pub service_name: String,
    pub cost: Rupees,
    pub quantity: i64,
    pub requested_date: Option<NaiveDate>,
    pub scheduled_date: Option<NaiveDate>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLineItem {
    pub service_name: String,
    pub cost: Rupees,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub requested_date: Option<NaiveDate>,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_quantity() -> i64 {
    1
}

impl NewLineItem {
    pub fn new<S: Into<String>>(service_name: S, cost: Rupees) -> Self {
        Self {
            service_name: service_name.into(),
            cost,
            quantity: 1,
            requested_date: None,
            scheduled_date: None,
            image_url: None,
        }
    }
}

//--------------------------------------       Feedback       -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    /// The requester who left the feedback.
    pub user_id: i64,
    /// The service catalog entry the feedback refers to.
    pub service_id: i64,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFeedback {
    pub user_id: i64,
    pub service_id: i64,
    pub rating: i32,
    #[serde(default)]
    pub comment: Option<String>,
}

impl NewFeedback {
    pub fn new(user_id: i64, service_id: i64, rating: i32) -> Self {
        Self { user_id, service_id, rating, comment: None }
    }
}

//--------------------------------------         User         -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

//--------------------------------------       Provider       -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Provider {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Running average over every rating left against any of this provider's services.
    pub avg_rating: RatingScore,
    pub total_ratings: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProvider {
    pub name: String,
    pub email: String,
}

//--------------------------------------  ServiceCatalogEntry -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ServiceCatalogEntry {
    pub id: i64,
    /// The provider offering this service.
    pub provider_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub cost: Rupees,
    /// Running average over every rating left against this entry.
    pub avg_rating: RatingScore,
    pub total_ratings: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewServiceCatalogEntry {
    pub provider_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub cost: Rupees,
}

impl NewServiceCatalogEntry {
    pub fn new<S: Into<String>>(provider_id: i64, name: S, cost: Rupees) -> Self {
        Self { provider_id, name: name.into(), description: None, cost }
    }
}
