use crate::{
    api::BackOfficeApiError,
    db_types::{ApiCredential, NewUser, User},
};

/// Administrative CRUD for back-office users and their API credentials.
#[allow(async_fn_in_trait)]
pub trait UserManagement {
    /// Creates a user with the given roles and provisions an API credential for it. The generated secret is only
    /// ever returned here.
    async fn create_user(&self, user: NewUser) -> Result<(User, ApiCredential), BackOfficeApiError>;

    async fn fetch_user_by_username(&self, username: &str) -> Result<Option<User>, BackOfficeApiError>;

    async fn delete_user(&self, username: &str) -> Result<(), BackOfficeApiError>;
}
