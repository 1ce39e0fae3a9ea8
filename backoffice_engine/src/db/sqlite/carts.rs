use chrono::{DateTime, Utc};
use sqlx::{Row, SqliteConnection};

use crate::{
    api::BackOfficeApiError,
    db_types::{Cart, CartItem},
};

fn db_err(e: sqlx::Error) -> BackOfficeApiError {
    BackOfficeApiError::DatabaseError(e.to_string())
}

async fn fetch_or_create_cart_id(user_id: i64, conn: &mut SqliteConnection) -> Result<i64, BackOfficeApiError> {
    let row = sqlx::query("SELECT id FROM carts WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?;
    if let Some(row) = row {
        return Ok(row.get::<i64, _>("id"));
    }
    let res = sqlx::query("INSERT INTO carts (user_id) VALUES (?)").bind(user_id).execute(conn).await.map_err(db_err)?;
    Ok(res.last_insert_rowid())
}

pub async fn fetch_cart(user_id: i64, conn: &mut SqliteConnection) -> Result<Cart, BackOfficeApiError> {
    let cart_id = fetch_or_create_cart_id(user_id, conn).await?;
    let updated_at = sqlx::query("SELECT updated_at FROM carts WHERE id = ?")
        .bind(cart_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err)?
        .get::<DateTime<Utc>, _>("updated_at");
    let items = sqlx::query_as::<_, CartItem>("SELECT sku, quantity FROM cart_items WHERE cart_id = ? ORDER BY sku")
        .bind(cart_id)
        .fetch_all(conn)
        .await
        .map_err(db_err)?;
    Ok(Cart { id: cart_id, user_id, items, updated_at })
}

pub async fn set_cart_item(
    user_id: i64,
    sku: &str,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Cart, BackOfficeApiError> {
    if quantity < 0 {
        return Err(BackOfficeApiError::InvalidInput(format!("Quantity must not be negative (was {quantity})")));
    }
    let item_exists = sqlx::query("SELECT 1 FROM items WHERE sku = ?")
        .bind(sku)
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?
        .is_some();
    if !item_exists {
        return Err(BackOfficeApiError::NotFound(format!("Item {sku}")));
    }
    let cart_id = fetch_or_create_cart_id(user_id, &mut *conn).await?;
    if quantity == 0 {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = ? AND sku = ?")
            .bind(cart_id)
            .bind(sku)
            .execute(&mut *conn)
            .await
            .map_err(db_err)?;
    } else {
        sqlx::query(
            r#"INSERT INTO cart_items (cart_id, sku, quantity) VALUES (?, ?, ?)
               ON CONFLICT (cart_id, sku) DO UPDATE SET quantity = excluded.quantity"#,
        )
        .bind(cart_id)
        .bind(sku)
        .bind(quantity)
        .execute(&mut *conn)
        .await
        .map_err(db_err)?;
    }
    sqlx::query("UPDATE carts SET updated_at = CURRENT_TIMESTAMP WHERE id = ?")
        .bind(cart_id)
        .execute(&mut *conn)
        .await
        .map_err(db_err)?;
    fetch_cart(user_id, conn).await
}

pub async fn clear_cart(user_id: i64, conn: &mut SqliteConnection) -> Result<(), BackOfficeApiError> {
    sqlx::query("DELETE FROM cart_items WHERE cart_id IN (SELECT id FROM carts WHERE user_id = ?)")
        .bind(user_id)
        .execute(conn)
        .await
        .map_err(db_err)?;
    Ok(())
}
