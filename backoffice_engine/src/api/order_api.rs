use std::fmt::Debug;

use crate::{
    api::BackOfficeApiError,
    db_types::{OrderId, OrderItemUpdate, OrderWithItems, Pagination, PurchaseOrder},
    traits::OrderManagement,
};

pub struct OrderApi<B> {
    db: B,
}

impl<B: Debug> Debug for OrderApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderApi ({:?})", self.db)
    }
}

impl<B> OrderApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderApi<B>
where B: OrderManagement
{
    pub async fn orders(&self, pagination: Pagination) -> Result<Vec<PurchaseOrder>, BackOfficeApiError> {
        self.db.fetch_orders(pagination).await
    }

    pub async fn order_by_id(&self, order_id: &OrderId) -> Result<Option<OrderWithItems>, BackOfficeApiError> {
        self.db.fetch_order_by_order_id(order_id).await
    }

    pub async fn update_order_items(
        &self,
        order_id: &OrderId,
        lines: &[OrderItemUpdate],
    ) -> Result<OrderWithItems, BackOfficeApiError> {
        self.db.update_order_items(order_id, lines).await
    }

    pub async fn checkout(&self, user_id: i64) -> Result<OrderWithItems, BackOfficeApiError> {
        self.db.create_order_from_cart(user_id).await
    }
}
