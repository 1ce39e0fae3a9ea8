use actix_web::{http::StatusCode, test::TestRequest};
use backoffice_engine::db_types::{Principal, Role};
use log::*;

use super::{
    helpers::{auth_header, auth_manager_with, configure_app, send},
    mocks::MockOrderManager,
};
use crate::auth::HmacAlgorithm;

const ORDERS_CANONICAL: &str = "GET\n/admin/purchase-orders\n";

fn principal_with(roles: Vec<Role>) -> Principal {
    Principal { user_id: 7, username: "carol".to_string(), roles }
}

fn orders_request() -> actix_http::Request {
    TestRequest::get()
        .uri("/admin/purchase-orders")
        .insert_header(("Authorization", auth_header(HmacAlgorithm::Sha1, "abc", "s3cr3t", ORDERS_CANONICAL)))
        .to_request()
}

fn order_manager_with_empty_page() -> MockOrderManager {
    let mut order_manager = MockOrderManager::new();
    order_manager.expect_fetch_orders().returning(|_| Ok(vec![]));
    order_manager
}

// The orders listing requires any of [Buyer, Admin].

#[actix_web::test]
async fn one_matching_role_is_enough() {
    let _ = env_logger::try_init().ok();
    let auth_manager = auth_manager_with("abc", "s3cr3t", principal_with(vec![Role::Buyer]));
    let (status, _, body) = send(configure_app(auth_manager, order_manager_with_empty_page()), orders_request()).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
}

#[actix_web::test]
async fn principal_without_any_required_role_is_forbidden() {
    let _ = env_logger::try_init().ok();
    let auth_manager = auth_manager_with("abc", "s3cr3t", principal_with(vec![]));
    let (status, challenge, body) =
        send(configure_app(auth_manager, order_manager_with_empty_page()), orders_request()).await;
    info!("Response body: {body}");
    assert_eq!(status, StatusCode::FORBIDDEN);
    // Authorization failures carry no challenge; the caller was identified, it just lacks privilege
    assert!(challenge.is_none());
    assert!(body.contains("Insufficient permissions."), "was: {body}");
}

#[actix_web::test]
async fn unrelated_roles_do_not_help() {
    let _ = env_logger::try_init().ok();
    let auth_manager = auth_manager_with("abc", "s3cr3t", principal_with(vec![Role::Customer]));
    let (status, _, _) = send(configure_app(auth_manager, order_manager_with_empty_page()), orders_request()).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn admin_role_is_also_admitted() {
    let _ = env_logger::try_init().ok();
    let auth_manager = auth_manager_with("abc", "s3cr3t", principal_with(vec![Role::Admin]));
    let (status, _, body) = send(configure_app(auth_manager, order_manager_with_empty_page()), orders_request()).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
}
