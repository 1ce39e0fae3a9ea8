use std::fmt::Debug;

use crate::{
    api::BackOfficeApiError,
    db_types::{Item, ItemUpdate, NewItem, Pagination},
    traits::CatalogManagement,
};

pub struct CatalogApi<B> {
    db: B,
}

impl<B: Debug> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi ({:?})", self.db)
    }
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub async fn items(&self, pagination: Pagination) -> Result<Vec<Item>, BackOfficeApiError> {
        self.db.fetch_items(pagination).await
    }

    pub async fn item_by_sku(&self, sku: &str) -> Result<Option<Item>, BackOfficeApiError> {
        self.db.fetch_item_by_sku(sku).await
    }

    pub async fn create_item(&self, item: NewItem) -> Result<Item, BackOfficeApiError> {
        self.db.insert_item(item).await
    }

    pub async fn update_item(&self, sku: &str, update: ItemUpdate) -> Result<Item, BackOfficeApiError> {
        self.db.update_item(sku, update).await
    }

    pub async fn delete_item(&self, sku: &str) -> Result<(), BackOfficeApiError> {
        self.db.delete_item(sku).await
    }
}
