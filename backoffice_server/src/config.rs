use std::env;

use log::*;
use mbo_common::helpers::parse_boolean_flag;

use crate::auth::HmacAlgorithm;

const DEFAULT_MBO_HOST: &str = "127.0.0.1";
const DEFAULT_MBO_PORT: u16 = 8360;
const DEFAULT_MBO_REALM: &str = "backoffice";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub proxy: ProxyConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_MBO_HOST.to_string(),
            port: DEFAULT_MBO_PORT,
            database_url: String::default(),
            auth: AuthConfig::default(),
            proxy: ProxyConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("MBO_HOST").ok().unwrap_or_else(|| DEFAULT_MBO_HOST.into());
        let port = env::var("MBO_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for MBO_PORT. {e} Using the default, {DEFAULT_MBO_PORT}, instead."
                    );
                    DEFAULT_MBO_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_MBO_PORT);
        let database_url = env::var("MBO_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ MBO_DATABASE_URL is not set. Please set it to the URL for the back-office database.");
            String::default()
        });
        let auth = AuthConfig::from_env_or_default();
        let proxy = ProxyConfig::from_env_or_default();
        Self { host, port, database_url, auth, proxy }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------

/// Configuration for the HMAC request authenticator.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// The label identifying the protection scope. It is echoed back to clients in the `WWW-Authenticate` challenge
    /// header on 401 responses.
    pub realm: String,
    /// The signature algorithm advertised in challenge responses. Incoming requests may use any supported algorithm;
    /// this one is only used when the server has to name one itself.
    pub algorithm: HmacAlgorithm,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { realm: DEFAULT_MBO_REALM.to_string(), algorithm: HmacAlgorithm::Sha1 }
    }
}

impl AuthConfig {
    pub fn from_env_or_default() -> Self {
        let realm = env::var("MBO_AUTH_REALM").ok().unwrap_or_else(|| {
            info!("🪛️ MBO_AUTH_REALM is not set. Using the default realm, '{DEFAULT_MBO_REALM}'.");
            DEFAULT_MBO_REALM.to_string()
        });
        let algorithm = env::var("MBO_AUTH_ALGORITHM")
            .ok()
            .and_then(|s| {
                s.parse::<HmacAlgorithm>()
                    .map_err(|e| warn!("🪛️ Invalid value for MBO_AUTH_ALGORITHM. {e}. Using the default."))
                    .ok()
            })
            .unwrap_or(HmacAlgorithm::Sha1);
        Self { realm, algorithm }
    }

    /// The value of the `WWW-Authenticate` header sent with 401 responses, e.g. `HmacSHA1 realm="backoffice"`.
    pub fn challenge(&self) -> String {
        format!("{} realm=\"{}\"", self.algorithm, self.realm)
    }
}

//-------------------------------------------------  ProxyConfig  ------------------------------------------------------

/// Controls how the client IP address is determined for audit logging when the server sits behind a reverse proxy.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProxyConfig {
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
}

impl ProxyConfig {
    pub fn from_env_or_default() -> Self {
        let use_x_forwarded_for = parse_boolean_flag(env::var("MBO_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("MBO_USE_FORWARDED").ok(), false);
        Self { use_x_forwarded_for, use_forwarded }
    }
}

#[cfg(test)]
mod test {
    use super::AuthConfig;

    #[test]
    fn challenge_format() {
        let config = AuthConfig::default();
        assert_eq!(config.challenge(), r#"HmacSHA1 realm="backoffice""#);
    }
}
