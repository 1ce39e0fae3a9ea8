use std::fmt::Debug;

use mbo_common::Secret;

use crate::{api::AuthApiError, db_types::Principal, traits::AuthManagement};

/// Identity-store façade used by the request authenticator.
pub struct AuthApi<B> {
    db: B,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B> AuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AuthApi<B>
where B: AuthManagement
{
    pub async fn fetch_secret_for_key(&self, key_id: &str) -> Result<Secret<String>, AuthApiError> {
        self.db.fetch_secret_for_key(key_id).await
    }

    pub async fn resolve_principal(&self, key_id: &str) -> Result<Principal, AuthApiError> {
        self.db.resolve_principal(key_id).await
    }
}
