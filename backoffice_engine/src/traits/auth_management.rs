use mbo_common::Secret;

use crate::{api::AuthApiError, db_types::Principal};

/// The `AuthManagement` trait defines the two lookups the request authenticator needs from the identity store.
///
/// Both are point lookups by API key id and must be safe to run concurrently; the store holds no per-request state.
/// Neither call distinguishes "key does not exist" from "key exists but may not be used" in its public error --
/// callers fold both into the same rejection so that the response does not leak which key ids are registered.
#[allow(async_fn_in_trait)]
pub trait AuthManagement {
    /// Fetches the shared secret for the given API key id. Returns [`AuthApiError::KeyNotFound`] when no credential
    /// row carries that key id.
    async fn fetch_secret_for_key(&self, key_id: &str) -> Result<Secret<String>, AuthApiError>;

    /// Resolves the [`Principal`] (user identity plus granted roles) for the given API key id. A key whose user
    /// account has been disabled resolves to [`AuthApiError::AccountDisabled`].
    async fn resolve_principal(&self, key_id: &str) -> Result<Principal, AuthApiError>;
}
