use log::error;
use mbo_common::Secret;
use sqlx::{Row, SqliteConnection};

use crate::{
    api::BackOfficeApiError,
    db_types::{ApiCredential, NewUser, Role, User},
};

fn db_err(e: sqlx::Error) -> BackOfficeApiError {
    BackOfficeApiError::DatabaseError(e.to_string())
}

const USER_COLUMNS: &str = "id, username, enabled, created_at, updated_at";

pub async fn fetch_user_by_username(
    username: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<User>, BackOfficeApiError> {
    let q = format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?");
    sqlx::query_as::<_, User>(&q).bind(username).fetch_optional(conn).await.map_err(db_err)
}

/// Inserts the user row, its role assignments and a freshly generated API credential. Must be called inside a
/// transaction.
pub async fn create_user(
    user: NewUser,
    credential: ApiCredential,
    conn: &mut SqliteConnection,
) -> Result<(User, ApiCredential), BackOfficeApiError> {
    let res = sqlx::query("INSERT INTO users (username) VALUES (?)").bind(&user.username).execute(&mut *conn).await;
    let user_id = match res {
        Ok(res) => res.last_insert_rowid(),
        Err(sqlx::Error::Database(de)) if de.is_unique_violation() => {
            return Err(BackOfficeApiError::AlreadyExists(format!("User {}", user.username)));
        },
        Err(e) => return Err(db_err(e)),
    };
    for role in &user.roles {
        assign_role(user_id, *role, &mut *conn).await?;
    }
    sqlx::query("INSERT INTO api_credentials (user_id, key_id, secret) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(&credential.key_id)
        .bind(credential.secret.reveal())
        .execute(&mut *conn)
        .await
        .map_err(db_err)?;
    let created = fetch_user_by_username(&user.username, conn)
        .await?
        .ok_or_else(|| BackOfficeApiError::DatabaseError("Created user could not be read back".to_string()))?;
    Ok((created, credential))
}

pub async fn assign_role(user_id: i64, role: Role, conn: &mut SqliteConnection) -> Result<(), BackOfficeApiError> {
    let role_id = sqlx::query("SELECT id FROM roles WHERE name = ?")
        .bind(role.to_string())
        .fetch_optional(&mut *conn)
        .await
        .map_err(db_err)?
        .map(|row| row.get::<i64, _>("id"))
        .ok_or_else(|| {
            error!("Role {role} is not present in the roles table. The schema and code have diverged.");
            BackOfficeApiError::DatabaseError("Internal error. Report this to the developers".to_string())
        })?;
    sqlx::query("INSERT INTO role_assignments (user_id, role_id) VALUES (?, ?) ON CONFLICT DO NOTHING")
        .bind(user_id)
        .bind(role_id)
        .execute(conn)
        .await
        .map_err(db_err)?;
    Ok(())
}

pub async fn delete_user(username: &str, conn: &mut SqliteConnection) -> Result<(), BackOfficeApiError> {
    let res = sqlx::query("DELETE FROM users WHERE username = ?").bind(username).execute(conn).await.map_err(db_err)?;
    if res.rows_affected() == 0 {
        return Err(BackOfficeApiError::NotFound(format!("User {username}")));
    }
    Ok(())
}

/// Generates an API credential with a fresh random key id and shared secret.
pub fn generate_credential() -> ApiCredential {
    use rand::{distributions::Alphanumeric, Rng};
    let mut rng = rand::thread_rng();
    let key_id: String = (&mut rng).sample_iter(Alphanumeric).take(16).map(char::from).collect();
    let secret: String = (&mut rng).sample_iter(Alphanumeric).take(40).map(char::from).collect();
    ApiCredential { key_id: format!("mbo_{key_id}"), secret: Secret::new(secret) }
}
