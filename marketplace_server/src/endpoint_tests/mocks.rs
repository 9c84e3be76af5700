use marketplace_engine::{
    db_types::{
        Feedback,
        LineItem,
        NewFeedback,
        NewOrder,
        NewProvider,
        NewServiceCatalogEntry,
        NewUser,
        Order,
        OrderId,
        OrderStatus,
        Provider,
        ServiceCatalogEntry,
        User,
    },
    traits::{
        CatalogApiError,
        CatalogManagement,
        FeedbackManagement,
        OrderFlowError,
        OrderManagement,
        PaymentGateway,
        PaymentGatewayApiError,
        PaymentIntent,
        RatingApiError,
    },
};
use mockall::mock;
use smp_common::Paise;

mock! {
    pub Backend {}
    impl OrderManagement for Backend {
        async fn insert_order(&self, order: NewOrder, order_id: OrderId) -> Result<Order, OrderFlowError>;
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderFlowError>;
        async fn fetch_all_orders(&self) -> Result<Vec<Order>, OrderFlowError>;
        async fn fetch_orders_for_user(&self, user_id: i64) -> Result<Vec<Order>, OrderFlowError>;
        async fn fetch_orders_for_provider(&self, provider_id: i64) -> Result<Vec<Order>, OrderFlowError>;
        async fn fetch_line_items(&self, order: &Order) -> Result<Vec<LineItem>, OrderFlowError>;
        async fn set_payment_intent(&self, order_id: &OrderId, intent_id: &str) -> Result<Order, OrderFlowError>;
        async fn mark_order_paid(&self, order_id: &OrderId) -> Result<Order, OrderFlowError>;
        async fn set_order_status(&self, order_id: &OrderId, status: OrderStatus) -> Result<Order, OrderFlowError>;
        async fn delete_order(&self, order_id: &OrderId) -> Result<bool, OrderFlowError>;
    }
    impl FeedbackManagement for Backend {
        async fn insert_feedback(&self, feedback: NewFeedback) -> Result<Feedback, RatingApiError>;
        async fn apply_rating(&self, service_id: i64, rating: i32) -> Result<(), RatingApiError>;
        async fn fetch_feedback_for_service(&self, service_id: i64) -> Result<Vec<Feedback>, RatingApiError>;
    }
    impl CatalogManagement for Backend {
        async fn insert_user(&self, user: NewUser) -> Result<User, CatalogApiError>;
        async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, CatalogApiError>;
        async fn delete_user(&self, user_id: i64) -> Result<bool, CatalogApiError>;
        async fn insert_provider(&self, provider: NewProvider) -> Result<Provider, CatalogApiError>;
        async fn fetch_provider(&self, provider_id: i64) -> Result<Option<Provider>, CatalogApiError>;
        async fn delete_provider(&self, provider_id: i64) -> Result<bool, CatalogApiError>;
        async fn insert_service(&self, entry: NewServiceCatalogEntry) -> Result<ServiceCatalogEntry, CatalogApiError>;
        async fn fetch_service(&self, service_id: i64) -> Result<Option<ServiceCatalogEntry>, CatalogApiError>;
        async fn delete_service(&self, service_id: i64) -> Result<bool, CatalogApiError>;
    }
}

mock! {
    pub Gateway {}
    impl PaymentGateway for Gateway {
        async fn create_intent(&self, amount: Paise, order_id: &OrderId) -> Result<PaymentIntent, PaymentGatewayApiError>;
        async fn confirm_intent(&self, intent_id: &str) -> Result<PaymentIntent, PaymentGatewayApiError>;
    }
}
