use std::fmt::Debug;

use crate::{
    api::BackOfficeApiError,
    db_types::{ApiCredential, NewUser, User},
    traits::UserManagement,
};

pub struct UserApi<B> {
    db: B,
}

impl<B: Debug> Debug for UserApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UserApi ({:?})", self.db)
    }
}

impl<B> UserApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> UserApi<B>
where B: UserManagement
{
    pub async fn create_user(&self, user: NewUser) -> Result<(User, ApiCredential), BackOfficeApiError> {
        self.db.create_user(user).await
    }

    pub async fn user_by_username(&self, username: &str) -> Result<Option<User>, BackOfficeApiError> {
        self.db.fetch_user_by_username(username).await
    }

    pub async fn delete_user(&self, username: &str) -> Result<(), BackOfficeApiError> {
        self.db.delete_user(username).await
    }
}
