use sqlx::SqliteConnection;

use crate::{
    api::BackOfficeApiError,
    db_types::{Item, ItemUpdate, NewItem, Pagination},
};

fn db_err(e: sqlx::Error) -> BackOfficeApiError {
    BackOfficeApiError::DatabaseError(e.to_string())
}

pub async fn fetch_items(pagination: Pagination, conn: &mut SqliteConnection) -> Result<Vec<Item>, BackOfficeApiError> {
    sqlx::query_as::<_, Item>(
        "SELECT id, sku, title, summary, price, stock, created_at, updated_at FROM items ORDER BY sku LIMIT ? OFFSET ?",
    )
    .bind(pagination.page_size)
    .bind(pagination.offset())
    .fetch_all(conn)
    .await
    .map_err(db_err)
}

pub async fn fetch_item_by_sku(sku: &str, conn: &mut SqliteConnection) -> Result<Option<Item>, BackOfficeApiError> {
    sqlx::query_as::<_, Item>(
        "SELECT id, sku, title, summary, price, stock, created_at, updated_at FROM items WHERE sku = ?",
    )
    .bind(sku)
    .fetch_optional(conn)
    .await
    .map_err(db_err)
}

pub async fn insert_item(item: NewItem, conn: &mut SqliteConnection) -> Result<Item, BackOfficeApiError> {
    let res = sqlx::query("INSERT INTO items (sku, title, summary, price, stock) VALUES (?, ?, ?, ?, ?)")
        .bind(&item.sku)
        .bind(&item.title)
        .bind(&item.summary)
        .bind(item.price)
        .bind(item.stock)
        .execute(&mut *conn)
        .await;
    match res {
        Ok(_) => fetch_item_by_sku(&item.sku, conn)
            .await?
            .ok_or_else(|| BackOfficeApiError::DatabaseError("Inserted item could not be read back".to_string())),
        Err(sqlx::Error::Database(de)) if de.is_unique_violation() => {
            Err(BackOfficeApiError::AlreadyExists(format!("Item {}", item.sku)))
        },
        Err(e) => Err(db_err(e)),
    }
}

pub async fn update_item(sku: &str, update: ItemUpdate, conn: &mut SqliteConnection) -> Result<Item, BackOfficeApiError> {
    let res = sqlx::query(
        r#"UPDATE items SET
            title = COALESCE(?, title),
            summary = COALESCE(?, summary),
            price = COALESCE(?, price),
            stock = COALESCE(?, stock),
            updated_at = CURRENT_TIMESTAMP
           WHERE sku = ?"#,
    )
    .bind(&update.title)
    .bind(&update.summary)
    .bind(update.price)
    .bind(update.stock)
    .bind(sku)
    .execute(&mut *conn)
    .await
    .map_err(db_err)?;
    if res.rows_affected() == 0 {
        return Err(BackOfficeApiError::NotFound(format!("Item {sku}")));
    }
    fetch_item_by_sku(sku, conn)
        .await?
        .ok_or_else(|| BackOfficeApiError::NotFound(format!("Item {sku}")))
}

pub async fn delete_item(sku: &str, conn: &mut SqliteConnection) -> Result<(), BackOfficeApiError> {
    let res = sqlx::query("DELETE FROM items WHERE sku = ?").bind(sku).execute(conn).await.map_err(db_err)?;
    if res.rows_affected() == 0 {
        return Err(BackOfficeApiError::NotFound(format!("Item {sku}")));
    }
    Ok(())
}
