//! Credential extraction and the authenticated principal.
//!
//! Requests carry their credentials in the `Authorization` header, in the form
//! `Authorization: <Algorithm> <KeyId> <Signature>`. The [`extract_credentials`] parser is the first step of the
//! authentication pipeline; the [`AuthenticatedUser`] extractor is the last, handing the resolved principal to route
//! handlers that declare it as a parameter.

use std::{fmt::Display, ops::Deref, str::FromStr};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use backoffice_engine::db_types::Principal;
use futures::future::{ready, Ready};
use log::warn;
use thiserror::Error;

use crate::errors::ServerError;

//-------------------------------------------------  HmacAlgorithm  ----------------------------------------------------

/// The keyed-hash algorithms a client may sign requests with. The wire names follow the JCA convention that existing
/// back-office clients already use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HmacAlgorithm {
    Sha1,
    Sha256,
}

impl Display for HmacAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HmacAlgorithm::Sha1 => write!(f, "HmacSHA1"),
            HmacAlgorithm::Sha256 => write!(f, "HmacSHA256"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Unsupported signature algorithm: {0}")]
pub struct UnsupportedAlgorithmError(pub String);

impl FromStr for HmacAlgorithm {
    type Err = UnsupportedAlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HmacSHA1" => Ok(Self::Sha1),
            "HmacSHA256" => Ok(Self::Sha256),
            s => Err(UnsupportedAlgorithmError(s.to_string())),
        }
    }
}

//-------------------------------------------------  HmacCredentials  --------------------------------------------------

/// The parsed contents of the `Authorization` header. Constructed fresh for every request and discarded with it.
#[derive(Debug, Clone)]
pub struct HmacCredentials {
    pub algorithm: HmacAlgorithm,
    pub key_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, Error)]
pub enum CredentialParseError {
    /// The header was absent or empty. Callers respond with a challenge rather than a plain rejection.
    #[error("No credentials were supplied")]
    Missing,
    #[error("Expected exactly 3 fields in the Authorization header, but found {0}")]
    Malformed(usize),
    #[error(transparent)]
    UnsupportedAlgorithm(#[from] UnsupportedAlgorithmError),
}

/// Parses the raw `Authorization` header value into [`HmacCredentials`]. A pure parse with no side effects.
pub fn extract_credentials(header: Option<&str>) -> Result<HmacCredentials, CredentialParseError> {
    let header = header.map(str::trim).filter(|h| !h.is_empty()).ok_or(CredentialParseError::Missing)?;
    let tokens = header.split_whitespace().collect::<Vec<&str>>();
    if tokens.len() != 3 {
        return Err(CredentialParseError::Malformed(tokens.len()));
    }
    let algorithm = tokens[0].parse::<HmacAlgorithm>()?;
    Ok(HmacCredentials { algorithm, key_id: tokens[1].to_string(), signature: tokens[2].to_string() })
}

//-------------------------------------------------  AuthenticatedUser  ------------------------------------------------

/// The principal resolved by the HMAC authenticator, as seen by route handlers.
///
/// Handlers declare this as a parameter; the extractor reads the value the authentication middleware attached to the
/// request. Handlers can never construct one themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub Principal);

impl Deref for AuthenticatedUser {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned().ok_or_else(|| {
            warn!("💻️ No authenticated principal attached to the request. Is the route behind the HMAC middleware?");
            ServerError::Unspecified("No authenticated principal attached to the request".to_string())
        });
        ready(user)
    }
}

#[cfg(test)]
mod test {
    use super::{extract_credentials, CredentialParseError, HmacAlgorithm};

    #[test]
    fn well_formed_header() {
        let creds = extract_credentials(Some("HmacSHA1 abc123 c2lnbmF0dXJl")).unwrap();
        assert_eq!(creds.algorithm, HmacAlgorithm::Sha1);
        assert_eq!(creds.key_id, "abc123");
        assert_eq!(creds.signature, "c2lnbmF0dXJl");
    }

    #[test]
    fn missing_header_is_distinct_from_malformed() {
        assert!(matches!(extract_credentials(None), Err(CredentialParseError::Missing)));
        assert!(matches!(extract_credentials(Some("")), Err(CredentialParseError::Missing)));
        assert!(matches!(extract_credentials(Some("   ")), Err(CredentialParseError::Missing)));
    }

    #[test]
    fn wrong_token_count_is_malformed() {
        assert!(matches!(extract_credentials(Some("HmacSHA1 abc")), Err(CredentialParseError::Malformed(2))));
        assert!(matches!(
            extract_credentials(Some("HmacSHA1 abc sig extra")),
            Err(CredentialParseError::Malformed(4))
        ));
    }

    #[test]
    fn unknown_algorithms_are_rejected() {
        let result = extract_credentials(Some("HmacMD5 abc sig"));
        assert!(matches!(result, Err(CredentialParseError::UnsupportedAlgorithm(_))));
    }

    #[test]
    fn algorithm_names_round_trip() {
        for alg in [HmacAlgorithm::Sha1, HmacAlgorithm::Sha256] {
            assert_eq!(alg.to_string().parse::<HmacAlgorithm>().unwrap(), alg);
        }
    }
}
