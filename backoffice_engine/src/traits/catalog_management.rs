use crate::{
    api::BackOfficeApiError,
    db_types::{Item, ItemUpdate, NewItem, Pagination},
};

/// CRUD behaviour for the item catalog.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Returns one page of catalog items, ordered by SKU.
    async fn fetch_items(&self, pagination: Pagination) -> Result<Vec<Item>, BackOfficeApiError>;

    async fn fetch_item_by_sku(&self, sku: &str) -> Result<Option<Item>, BackOfficeApiError>;

    /// Inserts a new item. Fails with [`BackOfficeApiError::AlreadyExists`] if the SKU is taken.
    async fn insert_item(&self, item: NewItem) -> Result<Item, BackOfficeApiError>;

    /// Applies the populated fields of `update` to the item with the given SKU and returns the updated row.
    async fn update_item(&self, sku: &str, update: ItemUpdate) -> Result<Item, BackOfficeApiError>;

    async fn delete_item(&self, sku: &str) -> Result<(), BackOfficeApiError>;
}
