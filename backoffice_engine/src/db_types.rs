use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use mbo_common::{Money, Secret};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------        Role         ---------------------------------------------------------
/// A named capability granted to a user. Route registrations declare the set of roles that may invoke them; the
/// authorization gate admits a caller if it holds any role in that set.
///
/// The JSON wire form uses the `ROLE_*` spelling that existing back-office clients expect. The database stores the
/// bare variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_CUSTOMER")]
    Customer,
    #[serde(rename = "ROLE_BUYER")]
    Buyer,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Customer => write!(f, "Customer"),
            Role::Buyer => write!(f, "Buyer"),
            Role::Admin => write!(f, "Admin"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid role: {0}")]
pub struct RoleConversionError(String);

impl FromStr for Role {
    type Err = RoleConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        let name = name.strip_prefix("ROLE_").unwrap_or(name);
        match name.to_ascii_lowercase().as_str() {
            "customer" => Ok(Self::Customer),
            "buyer" => Ok(Self::Buyer),
            "admin" => Ok(Self::Admin),
            _ => Err(RoleConversionError(s.to_string())),
        }
    }
}

//--------------------------------------      Principal      ---------------------------------------------------------
/// The authenticated caller: the identity resolved from a valid set of credentials, plus the roles granted to it.
/// Constructed per request by the authenticator and discarded when the response is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: i64,
    pub username: String,
    pub roles: Vec<Role>,
}

impl Principal {
    /// Any-of semantics: an empty requirement set admits every authenticated caller.
    pub fn has_any_role(&self, required: &[Role]) -> bool {
        required.is_empty() || required.iter().any(|role| self.roles.contains(role))
    }
}

//--------------------------------------        User         ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub roles: Vec<Role>,
}

/// The API credential provisioned for a user. The secret is returned exactly once, at creation time.
#[derive(Debug, Clone)]
pub struct ApiCredential {
    pub key_id: String,
    pub secret: Secret<String>,
}

//--------------------------------------        Item         ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub sku: String,
    pub title: String,
    pub summary: Option<String>,
    pub price: Money,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub sku: String,
    pub title: String,
    pub summary: Option<String>,
    pub price: Money,
    pub stock: i64,
}

/// Partial update for an item. Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<i64>,
}

//--------------------------------------        Cart         ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CartItem {
    pub sku: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: i64,
    pub user_id: i64,
    pub items: Vec<CartItem>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       OrderId       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   OrderStatusType   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatusType {
    /// The order is newly created, and no payments have been received.
    New,
    /// The order has been created and the payment has been received in full.
    Paid,
    /// The order has been cancelled by the user or admin.
    Cancelled,
    /// The order has expired.
    Expired,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::New => write!(f, "New"),
            OrderStatusType::Paid => write!(f, "Paid"),
            OrderStatusType::Cancelled => write!(f, "Cancelled"),
            OrderStatusType::Expired => write!(f, "Expired"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct OrderStatusConversionError(String);

impl FromStr for OrderStatusType {
    type Err = OrderStatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "New" => Ok(Self::New),
            "Paid" => Ok(Self::Paid),
            "Cancelled" => Ok(Self::Cancelled),
            "Expired" => Ok(Self::Expired),
            s => Err(OrderStatusConversionError(s.to_string())),
        }
    }
}

//--------------------------------------    PurchaseOrder    ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: i64,
    pub order_id: OrderId,
    pub user_id: i64,
    #[sqlx(try_from = "String")]
    pub status: OrderStatusType,
    pub total: Money,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub sku: String,
    pub quantity: i64,
    pub unit_price: Money,
}

/// An order header together with its line items, as returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub items: Vec<OrderLineItem>,
}

/// A requested change to one order line. A quantity of zero removes the line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemUpdate {
    pub sku: String,
    pub quantity: i64,
}

impl TryFrom<String> for OrderStatusType {
    type Error = OrderStatusConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

//--------------------------------------      Pagination     ---------------------------------------------------------
/// Paging window for collection queries, driven by the `ps` (page size) and `pn` (page number) query parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    pub page_size: i64,
    pub page_number: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page_size: 50, page_number: 0 }
    }
}

impl Pagination {
    pub fn new(page_size: i64, page_number: i64) -> Self {
        Self { page_size: page_size.clamp(1, 500), page_number: page_number.max(0) }
    }

    pub fn offset(&self) -> i64 {
        self.page_size * self.page_number
    }
}

#[cfg(test)]
mod test {
    use super::{OrderStatusType, Pagination, Principal, Role};

    #[test]
    fn role_round_trip() {
        for role in [Role::Customer, Role::Buyer, Role::Admin] {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert_eq!("ROLE_BUYER".parse::<Role>().unwrap(), Role::Buyer);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn role_wire_form() {
        let json = serde_json::to_string(&vec![Role::Buyer, Role::Admin]).unwrap();
        assert_eq!(json, r#"["ROLE_BUYER","ROLE_ADMIN"]"#);
    }

    #[test]
    fn any_of_role_check() {
        let principal =
            Principal { user_id: 1, username: "alice".to_string(), roles: vec![Role::Buyer] };
        assert!(principal.has_any_role(&[Role::Buyer, Role::Admin]));
        assert!(principal.has_any_role(&[]));
        assert!(!principal.has_any_role(&[Role::Admin]));
        let nobody = Principal { user_id: 2, username: "bob".to_string(), roles: vec![] };
        assert!(!nobody.has_any_role(&[Role::Admin]));
    }

    #[test]
    fn order_status_round_trip() {
        for status in
            [OrderStatusType::New, OrderStatusType::Paid, OrderStatusType::Cancelled, OrderStatusType::Expired]
        {
            assert_eq!(status.to_string().parse::<OrderStatusType>().unwrap(), status);
        }
        assert!("Shipped".parse::<OrderStatusType>().is_err());
    }

    #[test]
    fn pagination_clamps_inputs() {
        let p = Pagination::new(10_000, -3);
        assert_eq!(p.page_size, 500);
        assert_eq!(p.page_number, 0);
        assert_eq!(Pagination::new(25, 3).offset(), 75);
    }
}
