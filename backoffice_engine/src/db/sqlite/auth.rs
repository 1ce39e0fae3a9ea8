use log::error;
use mbo_common::Secret;
use sqlx::{Row, SqliteConnection};

use crate::{api::AuthApiError, db_types::Principal};

pub async fn fetch_secret_for_key(key_id: &str, conn: &mut SqliteConnection) -> Result<Secret<String>, AuthApiError> {
    let row = sqlx::query("SELECT secret FROM api_credentials WHERE key_id = ?")
        .bind(key_id)
        .fetch_optional(conn)
        .await
        .map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
    match row {
        Some(row) => Ok(Secret::new(row.get::<String, _>("secret"))),
        None => Err(AuthApiError::KeyNotFound),
    }
}

pub async fn resolve_principal(key_id: &str, conn: &mut SqliteConnection) -> Result<Principal, AuthApiError> {
    let row = sqlx::query(
        r#"SELECT users.id as "id", users.username as "username", users.enabled as "enabled"
           FROM users JOIN api_credentials ON api_credentials.user_id = users.id
           WHERE api_credentials.key_id = ?"#,
    )
    .bind(key_id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
    let row = row.ok_or(AuthApiError::KeyNotFound)?;
    let user_id = row.get::<i64, _>("id");
    let username = row.get::<String, _>("username");
    if !row.get::<bool, _>("enabled") {
        return Err(AuthApiError::AccountDisabled);
    }
    let roles = roles_for_user(user_id, conn).await?;
    Ok(Principal { user_id, username, roles })
}

pub async fn roles_for_user(user_id: i64, conn: &mut SqliteConnection) -> Result<Vec<crate::db_types::Role>, AuthApiError> {
    let rows = sqlx::query(
        r#"SELECT name FROM role_assignments LEFT JOIN roles ON role_assignments.role_id = roles.id
           WHERE user_id = ?"#,
    )
    .bind(user_id)
    .fetch_all(conn)
    .await
    .map_err(|e| AuthApiError::DatabaseError(e.to_string()))?;
    rows.iter()
        .map(|row| {
            row.get::<String, _>("name").parse().map_err(|e| {
                error!("Role definitions in the database and code have diverged. {e}");
                AuthApiError::DatabaseError("Internal error. Report this to the developers".to_string())
            })
        })
        .collect()
}
