use backoffice_engine::{
    db_types::{
        ApiCredential,
        Cart,
        Item,
        ItemUpdate,
        NewItem,
        NewUser,
        OrderId,
        OrderItemUpdate,
        OrderWithItems,
        Pagination,
        Principal,
        PurchaseOrder,
        User,
    },
    traits::{AuthManagement, CartManagement, CatalogManagement, OrderManagement, UserManagement},
    AuthApiError,
    BackOfficeApiError,
};
use mbo_common::Secret;
use mockall::mock;

mock! {
    pub AuthManager {}
    impl AuthManagement for AuthManager {
        async fn fetch_secret_for_key(&self, key_id: &str) -> Result<Secret<String>, AuthApiError>;
        async fn resolve_principal(&self, key_id: &str) -> Result<Principal, AuthApiError>;
    }
}

mock! {
    pub CatalogManager {}
    impl CatalogManagement for CatalogManager {
        async fn fetch_items(&self, pagination: Pagination) -> Result<Vec<Item>, BackOfficeApiError>;
        async fn fetch_item_by_sku(&self, sku: &str) -> Result<Option<Item>, BackOfficeApiError>;
        async fn insert_item(&self, item: NewItem) -> Result<Item, BackOfficeApiError>;
        async fn update_item(&self, sku: &str, update: ItemUpdate) -> Result<Item, BackOfficeApiError>;
        async fn delete_item(&self, sku: &str) -> Result<(), BackOfficeApiError>;
    }
}

mock! {
    pub CartManager {}
    impl CartManagement for CartManager {
        async fn fetch_cart(&self, user_id: i64) -> Result<Cart, BackOfficeApiError>;
        async fn set_cart_item(&self, user_id: i64, sku: &str, quantity: i64) -> Result<Cart, BackOfficeApiError>;
        async fn clear_cart(&self, user_id: i64) -> Result<(), BackOfficeApiError>;
    }
}

mock! {
    pub OrderManager {}
    impl OrderManagement for OrderManager {
        async fn fetch_orders(&self, pagination: Pagination) -> Result<Vec<PurchaseOrder>, BackOfficeApiError>;
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<OrderWithItems>, BackOfficeApiError>;
        async fn update_order_items(&self, order_id: &OrderId, lines: &[OrderItemUpdate]) -> Result<OrderWithItems, BackOfficeApiError>;
        async fn create_order_from_cart(&self, user_id: i64) -> Result<OrderWithItems, BackOfficeApiError>;
    }
}

mock! {
    pub UserManager {}
    impl UserManagement for UserManager {
        async fn create_user(&self, user: NewUser) -> Result<(User, ApiCredential), BackOfficeApiError>;
        async fn fetch_user_by_username(&self, username: &str) -> Result<Option<User>, BackOfficeApiError>;
        async fn delete_user(&self, username: &str) -> Result<(), BackOfficeApiError>;
    }
}
