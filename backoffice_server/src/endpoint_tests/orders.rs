use actix_web::{http::StatusCode, test::TestRequest};
use backoffice_engine::db_types::{
    OrderId,
    OrderLineItem,
    OrderStatusType,
    OrderWithItems,
    Principal,
    PurchaseOrder,
    Role,
};
use chrono::Utc;
use log::*;
use mbo_common::Money;

use super::{
    helpers::{auth_header, auth_manager_with, configure_app, send},
    mocks::MockOrderManager,
};
use crate::{auth::HmacAlgorithm, canonical::canonical_representation};

fn admin() -> Principal {
    Principal { user_id: 1, username: "alice".to_string(), roles: vec![Role::Admin] }
}

fn sample_order() -> OrderWithItems {
    OrderWithItems {
        order: PurchaseOrder {
            id: 1,
            order_id: OrderId("PO-1".to_string()),
            user_id: 2,
            status: OrderStatusType::New,
            total: Money::from(2100),
            currency: "USD".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        },
        items: vec![OrderLineItem { sku: "WIDGET-1".to_string(), quantity: 2, unit_price: Money::from(1050) }],
    }
}

#[actix_web::test]
async fn orders_listing_returns_the_page() {
    let _ = env_logger::try_init().ok();
    let mut order_manager = MockOrderManager::new();
    order_manager.expect_fetch_orders().returning(|_| Ok(vec![sample_order().order]));
    let canonical = "GET\n/admin/purchase-orders\nps=10&pn=0";
    let req = TestRequest::get()
        .uri("/admin/purchase-orders?ps=10&pn=0")
        .insert_header(("Authorization", auth_header(HmacAlgorithm::Sha1, "abc", "s3cr3t", canonical)))
        .to_request();
    let auth_manager = auth_manager_with("abc", "s3cr3t", admin());
    let (status, _, body) = send(configure_app(auth_manager, order_manager), req).await;
    info!("Response body: {body}");
    assert_eq!(status, StatusCode::OK, "was: {body}");
    assert!(body.contains(r#""order_id":"PO-1""#), "was: {body}");
    assert!(body.contains(r#""status":"New""#), "was: {body}");
}

#[actix_web::test]
async fn missing_order_is_not_found() {
    let _ = env_logger::try_init().ok();
    let mut order_manager = MockOrderManager::new();
    order_manager.expect_fetch_order_by_order_id().returning(|_| Ok(None));
    let canonical = "GET\n/admin/purchase-orders/PO-404\n";
    let req = TestRequest::get()
        .uri("/admin/purchase-orders/PO-404")
        .insert_header(("Authorization", auth_header(HmacAlgorithm::Sha1, "abc", "s3cr3t", canonical)))
        .to_request();
    let auth_manager = auth_manager_with("abc", "s3cr3t", admin());
    let (status, _, body) = send(configure_app(auth_manager, order_manager), req).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "was: {body}");
}

#[actix_web::test]
async fn order_update_signs_the_body_digest() {
    let _ = env_logger::try_init().ok();
    let payload = r#"{"items":[{"sku":"WIDGET-1","quantity":3}]}"#;
    let mut order_manager = MockOrderManager::new();
    order_manager.expect_update_order_items().returning(|_, lines| {
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].sku, "WIDGET-1");
        assert_eq!(lines[0].quantity, 3);
        Ok(sample_order())
    });
    // The client derives the canonical representation from the request it is about to send
    let canonical =
        canonical_representation("PUT", "/admin/purchase-orders/PO-1", "", payload.as_bytes()).unwrap();
    let req = TestRequest::put()
        .uri("/admin/purchase-orders/PO-1")
        .insert_header(("Authorization", auth_header(HmacAlgorithm::Sha1, "abc", "s3cr3t", &canonical)))
        .insert_header(("Content-Type", "application/json"))
        .set_payload(payload)
        .to_request();
    let auth_manager = auth_manager_with("abc", "s3cr3t", admin());
    let (status, _, body) = send(configure_app(auth_manager, order_manager), req).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    assert!(body.contains(r#""order_id":"PO-1""#), "was: {body}");
}

#[actix_web::test]
async fn tampered_body_fails_verification() {
    let _ = env_logger::try_init().ok();
    let signed_payload = r#"{"items":[{"sku":"WIDGET-1","quantity":3}]}"#;
    let sent_payload = r#"{"items":[{"sku":"WIDGET-1","quantity":9}]}"#;
    let order_manager = MockOrderManager::new();
    let canonical =
        canonical_representation("PUT", "/admin/purchase-orders/PO-1", "", signed_payload.as_bytes()).unwrap();
    let req = TestRequest::put()
        .uri("/admin/purchase-orders/PO-1")
        .insert_header(("Authorization", auth_header(HmacAlgorithm::Sha1, "abc", "s3cr3t", &canonical)))
        .insert_header(("Content-Type", "application/json"))
        .set_payload(sent_payload)
        .to_request();
    let auth_manager = auth_manager_with("abc", "s3cr3t", admin());
    let (status, challenge, _) = send(configure_app(auth_manager, order_manager), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(challenge.is_some());
}
