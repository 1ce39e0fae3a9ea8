use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use backoffice_engine::{AuthApi, CartApi, CatalogApi, OrderApi, SqliteDatabase, UserApi};
use log::info;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    middleware::HmacAuthMiddlewareFactory,
    routes::{
        health,
        CheckoutRoute,
        ClearCartRoute,
        CreateItemRoute,
        CreateUserRoute,
        DeleteItemRoute,
        DeleteUserRoute,
        ItemBySkuRoute,
        ItemsRoute,
        MyCartRoute,
        OrderByIdRoute,
        OrdersRoute,
        SetCartItemRoute,
        UpdateItemRoute,
        UpdateOrderRoute,
        UserByUsernameRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    info!("🚀️ Database connection established at {}", db.url());
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let auth_api = AuthApi::new(db.clone());
        let catalog_api = CatalogApi::new(db.clone());
        let cart_api = CartApi::new(db.clone());
        let order_api = OrderApi::new(db.clone());
        let user_api = UserApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("mbo::access_log"))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(catalog_api))
            .app_data(web::Data::new(cart_api))
            .app_data(web::Data::new(order_api))
            .app_data(web::Data::new(user_api));
        // Every route in these scopes sits behind the HMAC authenticator. Role requirements are bound per route at
        // registration time, inside the route! macro.
        let api_scope = web::scope("/api")
            .wrap(HmacAuthMiddlewareFactory::<SqliteDatabase>::new(config.auth.clone(), config.proxy))
            .service(ItemsRoute::<SqliteDatabase>::new())
            .service(ItemBySkuRoute::<SqliteDatabase>::new())
            .service(CreateItemRoute::<SqliteDatabase>::new())
            .service(UpdateItemRoute::<SqliteDatabase>::new())
            .service(DeleteItemRoute::<SqliteDatabase>::new())
            .service(MyCartRoute::<SqliteDatabase>::new())
            .service(SetCartItemRoute::<SqliteDatabase>::new())
            .service(ClearCartRoute::<SqliteDatabase>::new())
            .service(CheckoutRoute::<SqliteDatabase>::new())
            .service(UserByUsernameRoute::<SqliteDatabase>::new())
            .service(CreateUserRoute::<SqliteDatabase>::new())
            .service(DeleteUserRoute::<SqliteDatabase>::new());
        let admin_scope = web::scope("/admin")
            .wrap(HmacAuthMiddlewareFactory::<SqliteDatabase>::new(config.auth.clone(), config.proxy))
            .service(OrdersRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(UpdateOrderRoute::<SqliteDatabase>::new());
        app.service(health).service(api_scope).service(admin_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
