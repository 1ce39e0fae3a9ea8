use crate::{
    api::BackOfficeApiError,
    db_types::{OrderId, OrderItemUpdate, OrderWithItems, Pagination, PurchaseOrder},
};

/// Behaviour for managing purchase orders.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Returns one page of purchase orders, newest first.
    async fn fetch_orders(&self, pagination: Pagination) -> Result<Vec<PurchaseOrder>, BackOfficeApiError>;

    async fn fetch_order_by_order_id(&self, order_id: &OrderId)
        -> Result<Option<OrderWithItems>, BackOfficeApiError>;

    /// Replaces the quantities of the given lines on an existing order. Line SKUs must refer to catalog items; the
    /// order total is recomputed from the resulting line set.
    async fn update_order_items(
        &self,
        order_id: &OrderId,
        lines: &[OrderItemUpdate],
    ) -> Result<OrderWithItems, BackOfficeApiError>;

    /// Converts the user's current cart into a new purchase order, pricing each line at the current catalog price,
    /// and empties the cart. An empty cart is rejected with [`BackOfficeApiError::InvalidInput`].
    async fn create_order_from_cart(&self, user_id: i64) -> Result<OrderWithItems, BackOfficeApiError>;
}
