use std::fmt::Debug;

use crate::{api::BackOfficeApiError, db_types::Cart, traits::CartManagement};

pub struct CartApi<B> {
    db: B,
}

impl<B: Debug> Debug for CartApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CartApi ({:?})", self.db)
    }
}

impl<B> CartApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CartApi<B>
where B: CartManagement
{
    pub async fn cart_for_user(&self, user_id: i64) -> Result<Cart, BackOfficeApiError> {
        self.db.fetch_cart(user_id).await
    }

    pub async fn set_cart_item(&self, user_id: i64, sku: &str, quantity: i64) -> Result<Cart, BackOfficeApiError> {
        self.db.set_cart_item(user_id, sku, quantity).await
    }

    pub async fn clear_cart(&self, user_id: i64) -> Result<(), BackOfficeApiError> {
        self.db.clear_cart(user_id).await
    }
}
