//! Round-trip tests for the bundled SQLite backend, run against an in-memory database.

use backoffice_engine::{
    db_types::{ItemUpdate, NewItem, NewUser, OrderItemUpdate, Pagination, Role},
    traits::{AuthManagement, CartManagement, CatalogManagement, OrderManagement, UserManagement},
    AuthApiError,
    BackOfficeApiError,
    SqliteDatabase,
};
use mbo_common::Money;

async fn new_db() -> SqliteDatabase {
    let _ = env_logger::try_init().ok();
    // A single connection, since every connection to :memory: gets its own database.
    SqliteDatabase::new_with_url("sqlite::memory:", 1).await.expect("Could not create in-memory database")
}

fn widget() -> NewItem {
    NewItem {
        sku: "WIDGET-1".to_string(),
        title: "Widget".to_string(),
        summary: Some("A widget".to_string()),
        price: Money::from(1050),
        stock: 10,
    }
}

#[tokio::test]
async fn user_provisioning_and_principal_resolution() {
    let db = new_db().await;
    let (user, credential) = db
        .create_user(NewUser { username: "alice".to_string(), roles: vec![Role::Buyer, Role::Admin] })
        .await
        .expect("Could not create user");
    assert_eq!(user.username, "alice");
    assert!(user.enabled);
    assert!(credential.key_id.starts_with("mbo_"));

    let secret = db.fetch_secret_for_key(&credential.key_id).await.expect("Secret lookup failed");
    assert_eq!(secret.reveal(), credential.secret.reveal());

    let principal = db.resolve_principal(&credential.key_id).await.expect("Principal lookup failed");
    assert_eq!(principal.user_id, user.id);
    assert_eq!(principal.username, "alice");
    assert!(principal.roles.contains(&Role::Buyer));
    assert!(principal.roles.contains(&Role::Admin));

    let err = db.fetch_secret_for_key("no-such-key").await.unwrap_err();
    assert!(matches!(err, AuthApiError::KeyNotFound));
    let err = db.resolve_principal("no-such-key").await.unwrap_err();
    assert!(matches!(err, AuthApiError::KeyNotFound));
}

#[tokio::test]
async fn duplicate_usernames_are_rejected() {
    let db = new_db().await;
    let new_user = NewUser { username: "alice".to_string(), roles: vec![Role::Customer] };
    db.create_user(new_user.clone()).await.expect("Could not create user");
    let err = db.create_user(new_user).await.unwrap_err();
    assert!(matches!(err, BackOfficeApiError::AlreadyExists(_)));
}

#[tokio::test]
async fn item_crud_round_trip() {
    let db = new_db().await;
    let item = db.insert_item(widget()).await.expect("Could not insert item");
    assert_eq!(item.sku, "WIDGET-1");
    assert_eq!(item.price, Money::from(1050));

    let err = db.insert_item(widget()).await.unwrap_err();
    assert!(matches!(err, BackOfficeApiError::AlreadyExists(_)));

    let update = ItemUpdate { price: Some(Money::from(995)), stock: Some(7), ..Default::default() };
    let updated = db.update_item("WIDGET-1", update).await.expect("Could not update item");
    assert_eq!(updated.price, Money::from(995));
    assert_eq!(updated.stock, 7);
    assert_eq!(updated.title, "Widget");

    let page = db.fetch_items(Pagination::default()).await.expect("Could not list items");
    assert_eq!(page.len(), 1);

    db.delete_item("WIDGET-1").await.expect("Could not delete item");
    assert!(db.fetch_item_by_sku("WIDGET-1").await.unwrap().is_none());
    let err = db.delete_item("WIDGET-1").await.unwrap_err();
    assert!(matches!(err, BackOfficeApiError::NotFound(_)));
}

#[tokio::test]
async fn cart_checkout_and_order_update() {
    let db = new_db().await;
    let (user, _) = db
        .create_user(NewUser { username: "bob".to_string(), roles: vec![Role::Customer] })
        .await
        .expect("Could not create user");
    db.insert_item(widget()).await.expect("Could not insert item");
    db.insert_item(NewItem {
        sku: "GADGET-1".to_string(),
        title: "Gadget".to_string(),
        summary: None,
        price: Money::from(200),
        stock: 3,
    })
    .await
    .expect("Could not insert item");

    // An empty cart cannot be checked out
    let err = db.create_order_from_cart(user.id).await.unwrap_err();
    assert!(matches!(err, BackOfficeApiError::InvalidInput(_)));

    let cart = db.set_cart_item(user.id, "WIDGET-1", 2).await.expect("Could not add to cart");
    assert_eq!(cart.items.len(), 1);
    let cart = db.set_cart_item(user.id, "GADGET-1", 1).await.expect("Could not add to cart");
    assert_eq!(cart.items.len(), 2);
    // Unknown SKUs are rejected
    let err = db.set_cart_item(user.id, "BOGUS", 1).await.unwrap_err();
    assert!(matches!(err, BackOfficeApiError::NotFound(_)));

    let order = db.create_order_from_cart(user.id).await.expect("Checkout failed");
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.order.total, Money::from(2 * 1050 + 200));
    // Checkout empties the cart
    let cart = db.fetch_cart(user.id).await.expect("Could not fetch cart");
    assert!(cart.items.is_empty());

    // Replace line quantities and drop a line
    let updated = db
        .update_order_items(
            &order.order.order_id,
            &[
                OrderItemUpdate { sku: "WIDGET-1".to_string(), quantity: 3 },
                OrderItemUpdate { sku: "GADGET-1".to_string(), quantity: 0 },
            ],
        )
        .await
        .expect("Could not update order");
    assert_eq!(updated.items.len(), 1);
    assert_eq!(updated.order.total, Money::from(3 * 1050));

    let page = db.fetch_orders(Pagination::default()).await.expect("Could not list orders");
    assert_eq!(page.len(), 1);
    let fetched = db.fetch_order_by_order_id(&order.order.order_id).await.unwrap().expect("Order not found");
    assert_eq!(fetched.order.id, order.order.id);
}
