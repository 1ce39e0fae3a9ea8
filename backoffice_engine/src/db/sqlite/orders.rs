use log::debug;
use mbo_common::Money;
use sqlx::{Row, SqliteConnection};

use crate::{
    api::BackOfficeApiError,
    db_types::{OrderId, OrderItemUpdate, OrderLineItem, OrderWithItems, Pagination, PurchaseOrder},
};

fn db_err(e: sqlx::Error) -> BackOfficeApiError {
    BackOfficeApiError::DatabaseError(e.to_string())
}

const ORDER_COLUMNS: &str = "id, order_id, user_id, status, total, currency, created_at, updated_at";

pub async fn fetch_orders(
    pagination: Pagination,
    conn: &mut SqliteConnection,
) -> Result<Vec<PurchaseOrder>, BackOfficeApiError> {
    let q = format!("SELECT {ORDER_COLUMNS} FROM purchase_orders ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?");
    sqlx::query_as::<_, PurchaseOrder>(&q)
        .bind(pagination.page_size)
        .bind(pagination.offset())
        .fetch_all(conn)
        .await
        .map_err(db_err)
}

async fn fetch_order_header(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<PurchaseOrder>, BackOfficeApiError> {
    let q = format!("SELECT {ORDER_COLUMNS} FROM purchase_orders WHERE order_id = ?");
    sqlx::query_as::<_, PurchaseOrder>(&q).bind(order_id.as_str()).fetch_optional(conn).await.map_err(db_err)
}

async fn fetch_order_lines(id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderLineItem>, BackOfficeApiError> {
    sqlx::query_as::<_, OrderLineItem>(
        "SELECT sku, quantity, unit_price FROM purchase_order_items WHERE purchase_order_id = ? ORDER BY sku",
    )
    .bind(id)
    .fetch_all(conn)
    .await
    .map_err(db_err)
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<OrderWithItems>, BackOfficeApiError> {
    let Some(order) = fetch_order_header(order_id, &mut *conn).await? else {
        return Ok(None);
    };
    let items = fetch_order_lines(order.id, conn).await?;
    Ok(Some(OrderWithItems { order, items }))
}

/// Replaces line quantities on an existing order. Must be called inside a transaction so that the line changes and
/// the recomputed total commit atomically.
pub async fn update_order_items(
    order_id: &OrderId,
    lines: &[OrderItemUpdate],
    conn: &mut SqliteConnection,
) -> Result<OrderWithItems, BackOfficeApiError> {
    let order = fetch_order_header(order_id, &mut *conn)
        .await?
        .ok_or_else(|| BackOfficeApiError::NotFound(format!("Order {order_id}")))?;
    for line in lines {
        if line.quantity < 0 {
            return Err(BackOfficeApiError::InvalidInput(format!(
                "Quantity for {} must not be negative (was {})",
                line.sku, line.quantity
            )));
        }
        if line.quantity == 0 {
            sqlx::query("DELETE FROM purchase_order_items WHERE purchase_order_id = ? AND sku = ?")
                .bind(order.id)
                .bind(&line.sku)
                .execute(&mut *conn)
                .await
                .map_err(db_err)?;
            continue;
        }
        let price = sqlx::query("SELECT price FROM items WHERE sku = ?")
            .bind(&line.sku)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err)?
            .map(|row| row.get::<Money, _>("price"))
            .ok_or_else(|| BackOfficeApiError::NotFound(format!("Item {}", line.sku)))?;
        sqlx::query(
            r#"INSERT INTO purchase_order_items (purchase_order_id, sku, quantity, unit_price) VALUES (?, ?, ?, ?)
               ON CONFLICT (purchase_order_id, sku) DO UPDATE SET quantity = excluded.quantity"#,
        )
        .bind(order.id)
        .bind(&line.sku)
        .bind(line.quantity)
        .bind(price)
        .execute(&mut *conn)
        .await
        .map_err(db_err)?;
    }
    refresh_order_total(order.id, &mut *conn).await?;
    debug!("🗃️ Order {order_id} lines updated");
    fetch_order_by_order_id(order_id, conn)
        .await?
        .ok_or_else(|| BackOfficeApiError::NotFound(format!("Order {order_id}")))
}

/// Creates a new purchase order from the user's current cart, pricing each line at the current catalog price, and
/// empties the cart. Must be called inside a transaction.
pub async fn create_order_from_cart(
    user_id: i64,
    order_id: OrderId,
    conn: &mut SqliteConnection,
) -> Result<OrderWithItems, BackOfficeApiError> {
    let cart = super::carts::fetch_cart(user_id, &mut *conn).await?;
    if cart.items.is_empty() {
        return Err(BackOfficeApiError::InvalidInput("Cart is empty".to_string()));
    }
    let res = sqlx::query("INSERT INTO purchase_orders (order_id, user_id) VALUES (?, ?)")
        .bind(order_id.as_str())
        .bind(user_id)
        .execute(&mut *conn)
        .await
        .map_err(db_err)?;
    let id = res.last_insert_rowid();
    for line in &cart.items {
        let price = sqlx::query("SELECT price FROM items WHERE sku = ?")
            .bind(&line.sku)
            .fetch_optional(&mut *conn)
            .await
            .map_err(db_err)?
            .map(|row| row.get::<Money, _>("price"))
            .ok_or_else(|| BackOfficeApiError::NotFound(format!("Item {}", line.sku)))?;
        sqlx::query("INSERT INTO purchase_order_items (purchase_order_id, sku, quantity, unit_price) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(&line.sku)
            .bind(line.quantity)
            .bind(price)
            .execute(&mut *conn)
            .await
            .map_err(db_err)?;
    }
    refresh_order_total(id, &mut *conn).await?;
    super::carts::clear_cart(user_id, &mut *conn).await?;
    debug!("🗃️ Order {order_id} created from the cart of user {user_id}");
    fetch_order_by_order_id(&order_id, conn)
        .await?
        .ok_or_else(|| BackOfficeApiError::DatabaseError("Created order could not be read back".to_string()))
}

async fn refresh_order_total(id: i64, conn: &mut SqliteConnection) -> Result<(), BackOfficeApiError> {
    sqlx::query(
        r#"UPDATE purchase_orders SET
            total = (SELECT COALESCE(SUM(quantity * unit_price), 0) FROM purchase_order_items
                     WHERE purchase_order_id = ?),
            updated_at = CURRENT_TIMESTAMP
           WHERE id = ?"#,
    )
    .bind(id)
    .bind(id)
    .execute(conn)
    .await
    .map_err(db_err)?;
    Ok(())
}
