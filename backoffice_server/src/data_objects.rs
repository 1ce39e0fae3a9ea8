use std::fmt::Display;

use backoffice_engine::db_types::{OrderItemUpdate, Pagination, Role, User};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The `ps` (page size) and `pn` (page number) query parameters used on paged collection endpoints.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PagingParams {
    pub ps: Option<i64>,
    pub pn: Option<i64>,
}

impl From<PagingParams> for Pagination {
    fn from(params: PagingParams) -> Self {
        let defaults = Pagination::default();
        Pagination::new(params.ps.unwrap_or(defaults.page_size), params.pn.unwrap_or(defaults.page_number))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserRequest {
    pub username: String,
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// Returned once, directly after user creation. This is the only time the generated secret leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserResponse {
    pub user: User,
    pub key_id: String,
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemRequest {
    pub sku: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrderRequest {
    pub items: Vec<OrderItemUpdate>,
}
