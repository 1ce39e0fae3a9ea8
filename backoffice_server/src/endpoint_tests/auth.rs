use actix_web::{http::StatusCode, test::TestRequest};
use backoffice_engine::{
    db_types::{Principal, Role},
    AuthApiError,
};
use log::*;

use super::{
    helpers::{auth_header, auth_manager_with, configure_app, send},
    mocks::{MockAuthManager, MockOrderManager},
};
use crate::auth::HmacAlgorithm;

const ORDERS_CANONICAL: &str = "GET\n/admin/purchase-orders\n";

fn buyer() -> Principal {
    Principal { user_id: 1, username: "alice".to_string(), roles: vec![Role::Buyer] }
}

fn order_manager_with_empty_page() -> MockOrderManager {
    let mut order_manager = MockOrderManager::new();
    order_manager.expect_fetch_orders().returning(|_| Ok(vec![]));
    order_manager
}

#[actix_web::test]
async fn request_without_credentials_receives_a_challenge() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get().uri("/admin/purchase-orders").to_request();
    let auth_manager = MockAuthManager::new();
    let (status, challenge, body) = send(configure_app(auth_manager, order_manager_with_empty_page()), req).await;
    info!("Response body: {body}");
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(challenge.as_deref(), Some(r#"HmacSHA1 realm="backoffice""#));
    assert!(body.contains("Credentials are required to access this resource."), "was: {body}");
}

#[actix_web::test]
async fn header_with_wrong_token_count_is_bad_request_not_unauthorized() {
    let _ = env_logger::try_init().ok();
    for header in ["HmacSHA1 abc", "HmacSHA1 abc sig extra"] {
        let req = TestRequest::get()
            .uri("/admin/purchase-orders")
            .insert_header(("Authorization", header))
            .to_request();
        let (status, challenge, body) =
            send(configure_app(MockAuthManager::new(), order_manager_with_empty_page()), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "was: {body}");
        assert!(challenge.is_none());
        assert!(body.contains("Expected exactly 3 fields"), "was: {body}");
    }
}

#[actix_web::test]
async fn unsupported_algorithm_is_bad_request() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get()
        .uri("/admin/purchase-orders")
        .insert_header(("Authorization", "HmacMD5 abc c2ln"))
        .to_request();
    let (status, _, body) = send(configure_app(MockAuthManager::new(), order_manager_with_empty_page()), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("Unsupported signature algorithm: HmacMD5"), "was: {body}");
}

#[actix_web::test]
async fn unknown_key_and_wrong_signature_are_indistinguishable() {
    let _ = env_logger::try_init().ok();
    // Unknown key id
    let req = TestRequest::get()
        .uri("/admin/purchase-orders")
        .insert_header(("Authorization", auth_header(HmacAlgorithm::Sha1, "nobody", "s3cr3t", ORDERS_CANONICAL)))
        .to_request();
    let mut unknown_key = MockAuthManager::new();
    unknown_key.expect_fetch_secret_for_key().returning(|_| Err(AuthApiError::KeyNotFound));
    let unknown = send(configure_app(unknown_key, order_manager_with_empty_page()), req).await;

    // Known key id, signature computed with the wrong secret
    let req = TestRequest::get()
        .uri("/admin/purchase-orders")
        .insert_header(("Authorization", auth_header(HmacAlgorithm::Sha1, "abc", "wrong-secret", ORDERS_CANONICAL)))
        .to_request();
    let known_key = auth_manager_with("abc", "s3cr3t", buyer());
    let mismatch = send(configure_app(known_key, order_manager_with_empty_page()), req).await;

    assert_eq!(unknown.0, StatusCode::UNAUTHORIZED);
    // The two rejections must be byte-identical so the endpoint cannot be used to probe for registered key ids
    assert_eq!(unknown, mismatch);
}

#[actix_web::test]
async fn disabled_account_is_indistinguishable_from_unknown_key() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get()
        .uri("/admin/purchase-orders")
        .insert_header(("Authorization", auth_header(HmacAlgorithm::Sha1, "abc", "s3cr3t", ORDERS_CANONICAL)))
        .to_request();
    let mut disabled = MockAuthManager::new();
    disabled.expect_fetch_secret_for_key().returning(|_| Err(AuthApiError::AccountDisabled));
    let (status, challenge, body) = send(configure_app(disabled, order_manager_with_empty_page()), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(challenge.as_deref(), Some(r#"HmacSHA1 realm="backoffice""#));
    assert!(body.contains("Credentials are invalid for this resource."), "was: {body}");
}

#[actix_web::test]
async fn valid_signature_is_authenticated_and_admitted() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get()
        .uri("/admin/purchase-orders")
        .insert_header(("Authorization", auth_header(HmacAlgorithm::Sha1, "abc", "s3cr3t", ORDERS_CANONICAL)))
        .to_request();
    let auth_manager = auth_manager_with("abc", "s3cr3t", buyer());
    let (status, _, body) = send(configure_app(auth_manager, order_manager_with_empty_page()), req).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
    assert_eq!(body, "[]");
}

#[actix_web::test]
async fn sha256_signatures_are_also_accepted() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get()
        .uri("/admin/purchase-orders")
        .insert_header(("Authorization", auth_header(HmacAlgorithm::Sha256, "abc", "s3cr3t", ORDERS_CANONICAL)))
        .to_request();
    let auth_manager = auth_manager_with("abc", "s3cr3t", buyer());
    let (status, _, body) = send(configure_app(auth_manager, order_manager_with_empty_page()), req).await;
    assert_eq!(status, StatusCode::OK, "was: {body}");
}

#[actix_web::test]
async fn signature_over_a_different_request_is_rejected() {
    let _ = env_logger::try_init().ok();
    // The signature is valid for a different query string, so the server-side canonical representation differs
    let req = TestRequest::get()
        .uri("/admin/purchase-orders?ps=10")
        .insert_header(("Authorization", auth_header(HmacAlgorithm::Sha1, "abc", "s3cr3t", ORDERS_CANONICAL)))
        .to_request();
    let auth_manager = auth_manager_with("abc", "s3cr3t", buyer());
    let (status, challenge, _) = send(configure_app(auth_manager, order_manager_with_empty_page()), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(challenge.is_some());
}

#[actix_web::test]
async fn identity_store_failure_is_a_generic_internal_error() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get()
        .uri("/admin/purchase-orders")
        .insert_header(("Authorization", auth_header(HmacAlgorithm::Sha1, "abc", "s3cr3t", ORDERS_CANONICAL)))
        .to_request();
    let mut broken = MockAuthManager::new();
    broken
        .expect_fetch_secret_for_key()
        .returning(|_| Err(AuthApiError::DatabaseError("connection pool timed out".to_string())));
    let (status, challenge, body) = send(configure_app(broken, order_manager_with_empty_page()), req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(challenge.is_none());
    // The store failure detail is logged, never sent to the caller
    assert_eq!(body, r#"{"error":"An internal error occurred on the server."}"#);
}

#[actix_web::test]
async fn principal_resolution_failure_is_unauthorized() {
    let _ = env_logger::try_init().ok();
    let req = TestRequest::get()
        .uri("/admin/purchase-orders")
        .insert_header(("Authorization", auth_header(HmacAlgorithm::Sha1, "abc", "s3cr3t", ORDERS_CANONICAL)))
        .to_request();
    let mut auth_manager = MockAuthManager::new();
    auth_manager.expect_fetch_secret_for_key().returning(|_| Ok("s3cr3t".to_string().into()));
    auth_manager.expect_resolve_principal().returning(|_| Err(AuthApiError::AccountDisabled));
    let (status, challenge, body) = send(configure_app(auth_manager, order_manager_with_empty_page()), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "was: {body}");
    assert_eq!(challenge.as_deref(), Some(r#"HmacSHA1 realm="backoffice""#));
}
