use crate::{api::BackOfficeApiError, db_types::Cart};

/// Behaviour for the per-customer shopping cart. Each user has at most one open cart; fetching a cart for a user
/// that does not have one yet creates it.
#[allow(async_fn_in_trait)]
pub trait CartManagement {
    async fn fetch_cart(&self, user_id: i64) -> Result<Cart, BackOfficeApiError>;

    /// Sets the quantity for the given SKU in the user's cart. A quantity of zero removes the line. The SKU must
    /// refer to an existing catalog item.
    async fn set_cart_item(&self, user_id: i64, sku: &str, quantity: i64) -> Result<Cart, BackOfficeApiError>;

    /// Removes every line from the user's cart.
    async fn clear_cart(&self, user_id: i64) -> Result<(), BackOfficeApiError>;
}
