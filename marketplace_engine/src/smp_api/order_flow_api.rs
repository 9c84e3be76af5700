use std::fmt::Debug;

use log::*;
use smp_common::INR_CURRENCY_CODE;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus},
    helpers::new_order_id,
    smp_api::order_objects::{OrderResult, PaymentInitiation},
    traits::{
        intent_is_pending,
        CatalogManagement,
        OrderFlowError,
        OrderManagement,
        PaymentGateway,
        PaymentGatewayApiError,
        PaymentIntent,
        INTENT_STATUS_SUCCEEDED,
    },
};

/// `OrderFlowApi` owns the order lifecycle: creation, payment initiation, payment confirmation, manual status
/// overrides and deletion.
///
/// The guarded lifecycle is `Requested` → `Paid` → `Completed`, with `Cancelled` reachable from any non-terminal
/// state. Payment steps talk to the external processor through the [`PaymentGateway`] contract; gateway calls are
/// made outside any database transaction so a slow processor never blocks unrelated orders.
pub struct OrderFlowApi<B, G> {
    db: B,
    gateway: G,
}

impl<B, G> Debug for OrderFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, G> OrderFlowApi<B, G> {
    pub fn new(db: B, gateway: G) -> Self {
        Self { db, gateway }
    }
}

impl<B, G> OrderFlowApi<B, G>
where
    B: OrderManagement + CatalogManagement,
    G: PaymentGateway,
{
    /// Submit a new order.
    ///
    /// The referenced requester and provider must both resolve, and the total cost must be positive; otherwise the
    /// order is rejected with a validation error and nothing is persisted.
    pub async fn create_order(&self, order: NewOrder) -> Result<OrderResult, OrderFlowError> {
        if !order.total_cost.is_positive() {
            return Err(OrderFlowError::ValidationError("Order cost must be greater than zero".to_string()));
        }
        self.db
            .fetch_user(order.user_id)
            .await?
            .ok_or_else(|| OrderFlowError::ValidationError("User from payload not found".to_string()))?;
        self.db
            .fetch_provider(order.provider_id)
            .await?
            .ok_or_else(|| OrderFlowError::ValidationError("Provider from payload not found".to_string()))?;
        let order_id = new_order_id();
        let saved = self.db.insert_order(order, order_id).await?;
        let line_items = self.db.fetch_line_items(&saved).await?;
        info!("🔄️📦️ Order [{}] created for user {} and provider {}", saved.order_id, saved.user_id, saved.provider_id);
        Ok(OrderResult { order: saved, line_items })
    }

    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<OrderResult>, OrderFlowError> {
        let order = match self.db.fetch_order_by_order_id(order_id).await? {
            Some(o) => o,
            None => return Ok(None),
        };
        let line_items = self.db.fetch_line_items(&order).await?;
        Ok(Some(OrderResult { order, line_items }))
    }

    pub async fn all_orders(&self) -> Result<Vec<Order>, OrderFlowError> {
        self.db.fetch_all_orders().await
    }

    /// All orders placed by the given requester. The requester must exist.
    pub async fn orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, OrderFlowError> {
        self.db.fetch_user(user_id).await?.ok_or(OrderFlowError::UserNotFound(user_id))?;
        self.db.fetch_orders_for_user(user_id).await
    }

    /// All orders assigned to the given provider. The provider must exist.
    pub async fn orders_for_provider(&self, provider_id: i64) -> Result<Vec<Order>, OrderFlowError> {
        self.db.fetch_provider(provider_id).await?.ok_or(OrderFlowError::ProviderNotFound(provider_id))?;
        self.db.fetch_orders_for_provider(provider_id).await
    }

    /// Start a payment for the order.
    ///
    /// Payment may not be started on an order that is already paid, nor restarted on a terminal one. On success
    /// the processor's intent id is stored against the order (the status stays unchanged) and the client secret,
    /// rupee amount and paise amount are returned.
    ///
    /// Calling this twice for the same order does not open a second charge attempt: if a stored intent is still
    /// pending at the processor, it is handed back to the client again.
    pub async fn initiate_payment(&self, order_id: &OrderId) -> Result<PaymentInitiation, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        if order.status == OrderStatus::Paid || order.status.is_terminal() {
            return Err(OrderFlowError::InvalidState(order_id.clone(), order.status));
        }
        let amount = order.total_cost.to_paise().map_err(|e| OrderFlowError::ValidationError(e.to_string()))?;

        if let Some(intent_id) = order.payment_intent_id.as_deref() {
            match self.gateway.confirm_intent(intent_id).await {
                Ok(intent) if intent_is_pending(&intent.status) => {
                    debug!("🔄️💳️ Order [{order_id}] already has pending intent [{intent_id}]. Reusing it.");
                    return Ok(payment_initiation(&order, intent, amount));
                },
                Ok(intent) if intent.status == INTENT_STATUS_SUCCEEDED => {
                    // Opening another intent here would charge the requester twice.
                    warn!("🔄️💳️ Intent [{intent_id}] for order [{order_id}] has already succeeded.");
                    return Err(OrderFlowError::ValidationError(format!(
                        "Payment for order {order_id} has already succeeded. Confirm the payment instead of \
                         initiating it again"
                    )));
                },
                Ok(intent) => {
                    warn!(
                        "🔄️💳️ Stored intent [{intent_id}] for order [{order_id}] is {}. A fresh intent will be \
                         created.",
                        intent.status
                    );
                },
                Err(PaymentGatewayApiError::IntentNotFound(_)) => {
                    warn!(
                        "🔄️💳️ Stored intent [{intent_id}] for order [{order_id}] is unknown to the processor. A \
                         fresh intent will be created."
                    );
                },
                Err(e) => return Err(e.into()),
            }
        }

        let intent = self.gateway.create_intent(amount, order_id).await?;
        let order = self.db.set_payment_intent(order_id, &intent.intent_id).await?;
        info!("🔄️💳️ Payment of {amount} initiated for order [{order_id}] with intent [{}]", intent.intent_id);
        Ok(payment_initiation(&order, intent, amount))
    }

    /// Settle the order if the processor reports the intent as succeeded.
    ///
    /// On success the order transitions to `Paid` and the payment timestamp is stamped. Any other intent status is
    /// reported back without mutating the order; so is a gateway failure.
    pub async fn confirm_payment(&self, order_id: &OrderId, intent_id: &str) -> Result<Order, OrderFlowError> {
        let order = self
            .db
            .fetch_order_by_order_id(order_id)
            .await?
            .ok_or_else(|| OrderFlowError::OrderNotFound(order_id.clone()))?;
        if order.payment_intent_id.as_deref() != Some(intent_id) {
            warn!(
                "🔄️✅️ Confirmation for order [{order_id}] supplied intent [{intent_id}], which is not the stored \
                 intent {:?}",
                order.payment_intent_id
            );
        }
        let intent = self.gateway.confirm_intent(intent_id).await?;
        if intent.status == INTENT_STATUS_SUCCEEDED {
            let updated = self.db.mark_order_paid(order_id).await?;
            info!("🔄️✅️ Order [{order_id}] paid via intent [{intent_id}]");
            Ok(updated)
        } else {
            debug!("🔄️✅️ Intent [{intent_id}] for order [{order_id}] reported status {}", intent.status);
            Err(OrderFlowError::PaymentNotSuccessful(intent.status))
        }
    }

    /// Overwrite the status of an order, unconditionally.
    ///
    /// This bypasses the guarded lifecycle used by the payment flow. It exists as the administrative override for
    /// manual cancellation and completion; restricting who may call it, and in which states, is the caller's
    /// responsibility. It can produce states the guarded flow never would (such as `Paid` back to `Requested`).
    pub async fn update_order_status(
        &self,
        order_id: &OrderId,
        new_status: OrderStatus,
    ) -> Result<Order, OrderFlowError> {
        let updated = self.db.set_order_status(order_id, new_status).await?;
        info!("🔄️📦️ Order [{order_id}] status set to {new_status}");
        Ok(updated)
    }

    /// Remove the order. Returns `true` if an order was deleted.
    pub async fn delete_order(&self, order_id: &OrderId) -> Result<bool, OrderFlowError> {
        let deleted = self.db.delete_order(order_id).await?;
        if deleted {
            info!("🔄️📦️ Order [{order_id}] deleted");
        }
        Ok(deleted)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

fn payment_initiation(order: &Order, intent: PaymentIntent, amount: smp_common::Paise) -> PaymentInitiation {
    PaymentInitiation {
        client_secret: intent.client_secret,
        amount_in_rupees: order.total_cost.rounded(),
        amount_in_paise: amount,
        currency: INR_CURRENCY_CODE.to_string(),
    }
}
