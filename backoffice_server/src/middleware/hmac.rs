//! HMAC request authentication middleware.
//!
//! This middleware runs in front of every protected scope and drives one request through the authentication state
//! machine: extract the credentials from the `Authorization` header, rebuild the canonical representation of the
//! request on the server side, look up the caller's shared secret, verify the supplied signature against the
//! recomputed one, and resolve the authenticated principal.
//!
//! On success the principal is attached to the request, where the [`AuthenticatedUser`] extractor picks it up. Every
//! failure is terminal and mapped to a response by [`ServerError`]: a 401 challenge for missing or invalid
//! credentials, 400 for malformed headers, and 500 for identity-store failures. Unknown key ids, signature
//! mismatches and disabled accounts all produce the same 401 response, so the endpoint cannot be used to probe which
//! key ids exist.

use std::{
    future::{ready, Ready},
    marker::PhantomData,
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    web,
    Error,
    HttpMessage,
};
use backoffice_engine::{traits::AuthManagement, AuthApi, AuthApiError};
use futures::future::LocalBoxFuture;
use log::{debug, trace, warn};

use crate::{
    auth::{extract_credentials, AuthenticatedUser, CredentialParseError},
    canonical::canonical_representation,
    config::{AuthConfig, ProxyConfig},
    errors::{AuthError, ServerError},
    helpers::get_remote_ip,
    signature,
};

pub struct HmacAuthMiddlewareFactory<A> {
    auth: AuthConfig,
    proxy: ProxyConfig,
    _backend: PhantomData<fn() -> A>,
}

impl<A> HmacAuthMiddlewareFactory<A> {
    pub fn new(auth: AuthConfig, proxy: ProxyConfig) -> Self {
        HmacAuthMiddlewareFactory { auth, proxy, _backend: PhantomData }
    }
}

impl<S, B, A> Transform<S, ServiceRequest> for HmacAuthMiddlewareFactory<A>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    A: AuthManagement + 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = HmacAuthMiddlewareService<S, A>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HmacAuthMiddlewareService {
            auth: self.auth.clone(),
            proxy: self.proxy,
            service: Rc::new(service),
            _backend: PhantomData,
        }))
    }
}

pub struct HmacAuthMiddlewareService<S, A> {
    auth: AuthConfig,
    proxy: ProxyConfig,
    service: Rc<S>,
    _backend: PhantomData<fn() -> A>,
}

impl<S, B, A> Service<ServiceRequest> for HmacAuthMiddlewareService<S, A>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
    A: AuthManagement + 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let auth = self.auth.clone();
        let proxy = self.proxy;
        Box::pin(async move {
            trace!("🔐️ Authenticating {} {}", req.method(), req.path());
            let header = match req.headers().get(AUTHORIZATION) {
                Some(value) => Some(
                    value
                        .to_str()
                        .map_err(|_| ServerError::from(AuthError::MalformedCredentials(0)))?
                        .to_string(),
                ),
                None => None,
            };
            let credentials = match extract_credentials(header.as_deref()) {
                Ok(credentials) => credentials,
                Err(e) => {
                    let peer = remote_peer(&req, proxy);
                    debug!("🔐️ Could not extract credentials from request{peer}. {e}");
                    let err = match e {
                        CredentialParseError::Missing => AuthError::NoCredentials { challenge: auth.challenge() },
                        CredentialParseError::Malformed(n) => AuthError::MalformedCredentials(n),
                        CredentialParseError::UnsupportedAlgorithm(e) => AuthError::UnsupportedAlgorithm(e.0),
                    };
                    return Err(ServerError::from(err).into());
                },
            };
            // The canonical representation covers the raw body, so take the payload and put it back once the digest
            // has been computed.
            let body = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract the request body: {e:?}");
                ServerError::InvalidRequestBody(e.to_string())
            })?;
            let canonical =
                canonical_representation(req.method().as_str(), req.path(), req.query_string(), body.as_ref())
                    .map_err(|e| ServerError::from(AuthError::CanonicalizationError(e.0)))?;
            req.set_payload(bytes_to_payload(body));
            trace!("🔐️ Server side canonical representation: '{canonical}'");
            let api = req.app_data::<web::Data<AuthApi<A>>>().cloned().ok_or_else(|| {
                warn!("🔐️ No AuthApi has been registered with the application. This is a server configuration bug.");
                ServerError::Unspecified("Authentication backend is not configured".to_string())
            })?;
            let unauthorized = || ServerError::from(AuthError::Unauthorized { challenge: auth.challenge() });
            let secret = match api.fetch_secret_for_key(&credentials.key_id).await {
                Ok(secret) => secret,
                Err(AuthApiError::KeyNotFound | AuthApiError::AccountDisabled) => {
                    warn!("🔐️ Rejecting request with unusable key id{}", remote_peer(&req, proxy));
                    return Err(unauthorized().into());
                },
                Err(AuthApiError::DatabaseError(e)) => return Err(ServerError::BackendError(e).into()),
            };
            if !signature::verify(credentials.algorithm, secret.reveal().as_bytes(), &canonical, &credentials.signature)
            {
                warn!("🔐️ Signature mismatch for key id {}{}", credentials.key_id, remote_peer(&req, proxy));
                return Err(unauthorized().into());
            }
            let principal = match api.resolve_principal(&credentials.key_id).await {
                Ok(principal) => principal,
                Err(AuthApiError::KeyNotFound | AuthApiError::AccountDisabled) => {
                    warn!("🔐️ Key id {} verified but does not resolve to a usable account", credentials.key_id);
                    return Err(unauthorized().into());
                },
                Err(AuthApiError::DatabaseError(e)) => return Err(ServerError::BackendError(e).into()),
            };
            trace!("🔐️ Request authenticated for {} ✅️", principal.username);
            req.extensions_mut().insert(AuthenticatedUser(principal));
            service.call(req).await
        })
    }
}

fn remote_peer(req: &ServiceRequest, proxy: ProxyConfig) -> String {
    get_remote_ip(req.request(), proxy.use_x_forwarded_for, proxy.use_forwarded)
        .map(|ip| format!(" from {ip}"))
        .unwrap_or_default()
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
