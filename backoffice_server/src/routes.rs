//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause
//! the current worker to stop processing new requests. Any long, non-cpu-bound operation (I/O, database queries,
//! identity-store lookups) must therefore be expressed as a future, so that worker threads keep serving other
//! requests while the operation is in flight.

use actix_web::{get, web, HttpResponse, Responder};
use backoffice_engine::{
    db_types::{NewItem, NewUser, OrderId, Role},
    traits::{CartManagement, CatalogManagement, OrderManagement, UserManagement},
    CartApi,
    CatalogApi,
    OrderApi,
    UserApi,
};
use log::*;

use crate::{
    auth::AuthenticatedUser,
    data_objects::{CartItemRequest, JsonResponse, NewUserRequest, NewUserResponse, PagingParams, UpdateOrderRequest},
    errors::ServerError,
};

// Actix-web cannot handle generics in handlers, so route registration is implemented manually using the `route!`
// macro. Each invocation emits a unit struct implementing `HttpServiceFactory` for one handler, optionally gated on
// a set of roles that is bound here, at registration time.
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($roles:expr),+]) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Catalog  ----------------------------------------------------
route!(items => Get "/items" impl CatalogManagement);
/// Provide a paged response of all items in the catalog. Any authenticated principal may browse the catalog.
pub async fn items<A: CatalogManagement>(
    query: web::Query<PagingParams>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET items");
    let items = api.items(query.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(items))
}

route!(item_by_sku => Get "/items/{sku}" impl CatalogManagement);
pub async fn item_by_sku<A: CatalogManagement>(
    path: web::Path<String>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let sku = path.into_inner();
    trace!("💻️ GET item {sku}");
    let item =
        api.item_by_sku(&sku).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Item {sku}")))?;
    Ok(HttpResponse::Ok().json(item))
}

route!(create_item => Post "/items" impl CatalogManagement where requires [Role::Admin]);
pub async fn create_item<A: CatalogManagement>(
    user: AuthenticatedUser,
    body: web::Json<NewItem>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let item = body.into_inner();
    debug!("💻️ POST item {} by {}", item.sku, user.username);
    let item = api.create_item(item).await?;
    Ok(HttpResponse::Created().json(item))
}

route!(update_item => Put "/items/{sku}" impl CatalogManagement where requires [Role::Admin]);
pub async fn update_item<A: CatalogManagement>(
    user: AuthenticatedUser,
    path: web::Path<String>,
    body: web::Json<backoffice_engine::db_types::ItemUpdate>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let sku = path.into_inner();
    debug!("💻️ PUT item {sku} by {}", user.username);
    let item = api.update_item(&sku, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

route!(delete_item => Delete "/items/{sku}" impl CatalogManagement where requires [Role::Admin]);
pub async fn delete_item<A: CatalogManagement>(
    user: AuthenticatedUser,
    path: web::Path<String>,
    api: web::Data<CatalogApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let sku = path.into_inner();
    debug!("💻️ DELETE item {sku} by {}", user.username);
    api.delete_item(&sku).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Item {sku} deleted"))))
}

//----------------------------------------------   Cart  ----------------------------------------------------
route!(my_cart => Get "/cart" impl CartManagement where requires [Role::Customer, Role::Buyer]);
/// Route handler for the current principal's cart. The cart queried is always the caller's own; there is no way to
/// address another user's cart through this endpoint.
pub async fn my_cart<A: CartManagement>(
    user: AuthenticatedUser,
    api: web::Data<CartApi<A>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET cart for {}", user.username);
    let cart = api.cart_for_user(user.user_id).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(set_cart_item => Post "/cart/items" impl CartManagement where requires [Role::Customer, Role::Buyer]);
pub async fn set_cart_item<A: CartManagement>(
    user: AuthenticatedUser,
    body: web::Json<CartItemRequest>,
    api: web::Data<CartApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let line = body.into_inner();
    debug!("💻️ POST cart item {} x{} for {}", line.sku, line.quantity, user.username);
    let cart = api.set_cart_item(user.user_id, &line.sku, line.quantity).await?;
    Ok(HttpResponse::Ok().json(cart))
}

route!(clear_cart => Delete "/cart" impl CartManagement where requires [Role::Customer, Role::Buyer]);
pub async fn clear_cart<A: CartManagement>(
    user: AuthenticatedUser,
    api: web::Data<CartApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ DELETE cart for {}", user.username);
    api.clear_cart(user.user_id).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success("Cart cleared")))
}

route!(checkout => Post "/purchase-orders" impl OrderManagement where requires [Role::Customer, Role::Buyer]);
/// Converts the caller's cart into a new purchase order. The lines are priced at the current catalog prices and the
/// cart is emptied on success.
pub async fn checkout<A: OrderManagement>(
    user: AuthenticatedUser,
    api: web::Data<OrderApi<A>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST checkout for {}", user.username);
    let order = api.checkout(user.user_id).await?;
    info!("💻️ Order {} created for {}", order.order.order_id, user.username);
    Ok(HttpResponse::Created().json(order))
}

//----------------------------------------------   Orders (admin)  ----------------------------------------------------
route!(orders => Get "/purchase-orders" impl OrderManagement where requires [Role::Buyer, Role::Admin]);
/// Provide a paged response of all purchase orders in the system, newest first.
pub async fn orders<A: OrderManagement>(
    query: web::Query<PagingParams>,
    api: web::Data<OrderApi<A>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET purchase orders");
    let orders = api.orders(query.into_inner().into()).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/purchase-orders/{order_id}" impl OrderManagement where requires [Role::Buyer, Role::Admin]);
pub async fn order_by_id<A: OrderManagement>(
    path: web::Path<OrderId>,
    api: web::Data<OrderApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    trace!("💻️ GET purchase order {order_id}");
    let order = api
        .order_by_id(&order_id)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id}")))?;
    Ok(HttpResponse::Ok().json(order))
}

route!(update_order => Put "/purchase-orders/{order_id}" impl OrderManagement where requires [Role::Buyer, Role::Admin]);
/// Update an existing purchase order with the populated line quantities. A quantity of zero removes the line; the
/// order total is recomputed from the resulting line set.
pub async fn update_order<A: OrderManagement>(
    user: AuthenticatedUser,
    path: web::Path<OrderId>,
    body: web::Json<UpdateOrderRequest>,
    api: web::Data<OrderApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ PUT purchase order {order_id} by {}", user.username);
    let order = api.update_order_items(&order_id, &body.into_inner().items).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Users (admin)  ----------------------------------------------------
route!(user_by_username => Get "/users/{username}" impl UserManagement where requires [Role::Admin]);
pub async fn user_by_username<A: UserManagement>(
    path: web::Path<String>,
    api: web::Data<UserApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let username = path.into_inner();
    trace!("💻️ GET user {username}");
    let user = api
        .user_by_username(&username)
        .await?
        .ok_or_else(|| ServerError::NoRecordFound(format!("User {username}")))?;
    Ok(HttpResponse::Ok().json(user))
}

route!(create_user => Post "/users" impl UserManagement where requires [Role::Admin]);
/// Creates a back-office user and provisions an API credential for it. The response carries the generated key id and
/// secret; the secret is not retrievable afterwards.
pub async fn create_user<A: UserManagement>(
    admin: AuthenticatedUser,
    body: web::Json<NewUserRequest>,
    api: web::Data<UserApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    info!("💻️ POST user {} by {}", request.username, admin.username);
    let new_user = NewUser { username: request.username, roles: request.roles };
    let (user, credential) = api.create_user(new_user).await?;
    let response = NewUserResponse {
        user,
        key_id: credential.key_id,
        secret: credential.secret.reveal().clone(),
    };
    Ok(HttpResponse::Created().json(response))
}

route!(delete_user => Delete "/users/{username}" impl UserManagement where requires [Role::Admin]);
pub async fn delete_user<A: UserManagement>(
    admin: AuthenticatedUser,
    path: web::Path<String>,
    api: web::Data<UserApi<A>>,
) -> Result<HttpResponse, ServerError> {
    let username = path.into_inner();
    info!("💻️ DELETE user {username} by {}", admin.username);
    api.delete_user(&username).await?;
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("User {username} deleted"))))
}
