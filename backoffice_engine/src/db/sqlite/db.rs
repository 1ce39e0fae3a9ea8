use std::fmt::Debug;

use mbo_common::Secret;
use sqlx::SqlitePool;

use super::{auth, carts, items, new_pool, orders, users};
use crate::{
    api::{AuthApiError, BackOfficeApiError},
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
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Connects to the database at `url`, creating the pool and running any outstanding migrations.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| sqlx::Error::Migrate(Box::new(e)))?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn fresh_order_id() -> OrderId {
    use rand::{distributions::Alphanumeric, Rng};
    let suffix: String = rand::thread_rng().sample_iter(Alphanumeric).take(10).map(char::from).collect();
    OrderId(format!("PO-{}", suffix.to_ascii_uppercase()))
}

impl AuthManagement for SqliteDatabase {
    async fn fetch_secret_for_key(&self, key_id: &str) -> Result<Secret<String>, AuthApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
        auth::fetch_secret_for_key(key_id, &mut conn).await
    }

    async fn resolve_principal(&self, key_id: &str) -> Result<Principal, AuthApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
        auth::resolve_principal(key_id, &mut conn).await
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_items(&self, pagination: Pagination) -> Result<Vec<Item>, BackOfficeApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        items::fetch_items(pagination, &mut conn).await
    }

    async fn fetch_item_by_sku(&self, sku: &str) -> Result<Option<Item>, BackOfficeApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        items::fetch_item_by_sku(sku, &mut conn).await
    }

    async fn insert_item(&self, item: NewItem) -> Result<Item, BackOfficeApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        items::insert_item(item, &mut conn).await
    }

    async fn update_item(&self, sku: &str, update: ItemUpdate) -> Result<Item, BackOfficeApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        items::update_item(sku, update, &mut conn).await
    }

    async fn delete_item(&self, sku: &str) -> Result<(), BackOfficeApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        items::delete_item(sku, &mut conn).await
    }
}

impl CartManagement for SqliteDatabase {
    async fn fetch_cart(&self, user_id: i64) -> Result<Cart, BackOfficeApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        carts::fetch_cart(user_id, &mut conn).await
    }

    async fn set_cart_item(&self, user_id: i64, sku: &str, quantity: i64) -> Result<Cart, BackOfficeApiError> {
        let mut tx = self.pool.begin().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        let cart = carts::set_cart_item(user_id, sku, quantity, &mut tx).await?;
        tx.commit().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        Ok(cart)
    }

    async fn clear_cart(&self, user_id: i64) -> Result<(), BackOfficeApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        carts::clear_cart(user_id, &mut conn).await
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_orders(&self, pagination: Pagination) -> Result<Vec<PurchaseOrder>, BackOfficeApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        orders::fetch_orders(pagination, &mut conn).await
    }

    async fn fetch_order_by_order_id(
        &self,
        order_id: &OrderId,
    ) -> Result<Option<OrderWithItems>, BackOfficeApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        orders::fetch_order_by_order_id(order_id, &mut conn).await
    }

    async fn update_order_items(
        &self,
        order_id: &OrderId,
        lines: &[OrderItemUpdate],
    ) -> Result<OrderWithItems, BackOfficeApiError> {
        let mut tx = self.pool.begin().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        let order = orders::update_order_items(order_id, lines, &mut tx).await?;
        tx.commit().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        Ok(order)
    }

    async fn create_order_from_cart(&self, user_id: i64) -> Result<OrderWithItems, BackOfficeApiError> {
        let mut tx = self.pool.begin().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        let order = orders::create_order_from_cart(user_id, fresh_order_id(), &mut tx).await?;
        tx.commit().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        Ok(order)
    }
}

impl UserManagement for SqliteDatabase {
    async fn create_user(&self, user: NewUser) -> Result<(User, ApiCredential), BackOfficeApiError> {
        let mut tx = self.pool.begin().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        let created = users::create_user(user, users::generate_credential(), &mut tx).await?;
        tx.commit().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        Ok(created)
    }

    async fn fetch_user_by_username(&self, username: &str) -> Result<Option<User>, BackOfficeApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        users::fetch_user_by_username(username, &mut conn).await
    }

    async fn delete_user(&self, username: &str) -> Result<(), BackOfficeApiError> {
        let mut conn = self.pool.acquire().await.map_err(|e| BackOfficeApiError::DatabaseError(e.to_string()))?;
        users::delete_user(username, &mut conn).await
    }
}
