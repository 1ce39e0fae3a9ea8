use actix_web::{
    body::MessageBody,
    http::{header::WWW_AUTHENTICATE, StatusCode},
    test,
    web,
    web::ServiceConfig,
    App,
    HttpResponse,
};
use backoffice_engine::{db_types::Principal, AuthApi, OrderApi};

use super::mocks::{MockAuthManager, MockOrderManager};
use crate::{
    auth::HmacAlgorithm,
    config::{AuthConfig, ProxyConfig},
    middleware::HmacAuthMiddlewareFactory,
    routes::{OrderByIdRoute, OrdersRoute, UpdateOrderRoute},
    signature::sign_base64,
};

/// Builds the `Authorization` header value a client would send for the given canonical representation.
pub fn auth_header(algorithm: HmacAlgorithm, key_id: &str, secret: &str, canonical: &str) -> String {
    format!("{algorithm} {key_id} {}", sign_base64(algorithm, secret.as_bytes(), canonical))
}

/// Wires the admin purchase-order routes behind the HMAC authenticator, exactly as the real server does, but with
/// mocked storage backends.
pub fn configure_app(
    auth_manager: MockAuthManager,
    order_manager: MockOrderManager,
) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        let auth_api = AuthApi::new(auth_manager);
        let order_api = OrderApi::new(order_manager);
        let scope = web::scope("/admin")
            .wrap(HmacAuthMiddlewareFactory::<MockAuthManager>::new(AuthConfig::default(), ProxyConfig::default()))
            .service(OrdersRoute::<MockOrderManager>::new())
            .service(OrderByIdRoute::<MockOrderManager>::new())
            .service(UpdateOrderRoute::<MockOrderManager>::new());
        cfg.app_data(web::Data::new(auth_api)).app_data(web::Data::new(order_api)).service(scope);
    }
}

/// A mocked identity store holding exactly one credential.
pub fn auth_manager_with(key_id: &'static str, secret: &'static str, principal: Principal) -> MockAuthManager {
    let mut auth_manager = MockAuthManager::new();
    auth_manager
        .expect_fetch_secret_for_key()
        .returning(move |k| if k == key_id { Ok(secret.to_string().into()) } else { Err(backoffice_engine::AuthApiError::KeyNotFound) });
    auth_manager
        .expect_resolve_principal()
        .returning(move |k| if k == key_id { Ok(principal.clone()) } else { Err(backoffice_engine::AuthApiError::KeyNotFound) });
    auth_manager
}

/// Sends the request against a freshly wired app and returns the response status, the `WWW-Authenticate` header (if
/// any) and the body text.
///
/// Rejections from the authentication middleware surface as service-level errors in the test harness; they are
/// rendered into responses here, the same way the HTTP dispatcher renders them in production.
pub async fn send(
    configure: impl FnOnce(&mut ServiceConfig),
    req: actix_http::Request,
) -> (StatusCode, Option<String>, String) {
    let app = App::new().configure(configure);
    let app = test::init_service(app).await;
    let res: HttpResponse = match test::try_call_service(&app, req).await {
        Ok(res) => res.into_parts().1,
        Err(e) => HttpResponse::from_error(e),
    };
    let status = res.status();
    let challenge = res.headers().get(WWW_AUTHENTICATE).and_then(|v| v.to_str().ok()).map(String::from);
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, challenge, body)
}
