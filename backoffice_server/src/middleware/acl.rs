//! Authorization gate middleware for the back-office server.
//!
//! This middleware can be placed on any route or service that sits behind the HMAC authenticator. Each route
//! registration declares the set of roles that may invoke it; the gate admits the request if the authenticated
//! principal holds *any* role in that set (an empty set admits every authenticated caller). A caller that was
//! identified but lacks privilege receives a 403 Forbidden response, distinct from the 401 forms the authenticator
//! produces.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
    HttpMessage,
};
use backoffice_engine::db_types::Role;
use futures::{
    future::{ok, Ready},
    Future,
};
use log::{debug, warn};

use crate::{
    auth::AuthenticatedUser,
    errors::{AuthError, ServerError},
};

pub struct AclMiddlewareFactory {
    required_roles: Vec<Role>,
}

impl AclMiddlewareFactory {
    pub fn new(required_roles: &[Role]) -> Self {
        AclMiddlewareFactory { required_roles: required_roles.to_vec() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AclMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService { required_roles: self.required_roles.clone(), service: Rc::new(service) })
    }
}

pub struct AclMiddlewareService<S> {
    required_roles: Vec<Role>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required_roles = self.required_roles.clone();
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<AuthenticatedUser>()
                .ok_or_else(|| {
                    warn!("🛂️ No authenticated principal found in request extensions");
                    ServerError::Unspecified("No authenticated principal found in request extensions".to_string())
                })?
                .clone();
            if user.has_any_role(&required_roles) {
                service.call(req).await
            } else {
                debug!("🛂️ {} does not hold any of the required roles {required_roles:?}", user.username);
                Err(ServerError::from(AuthError::Forbidden).into())
            }
        })
    }
}
