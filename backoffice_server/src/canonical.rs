//! The canonical request representation.
//!
//! Both the client and the server derive the exact same byte string from a request, and that string is what gets
//! signed. The encoding is `"{METHOD}\n{path}\n{tail}"`, where `tail` is the raw query string for bodyless methods
//! and the lowercase hex SHA-256 digest of the body for entity methods. The newline delimiter cannot appear inside a
//! method, path or query, so field boundaries cannot shift between two distinct requests.
//!
//! Note that the representation binds no timestamp or nonce, so a captured request replays verbatim until the key is
//! rotated. This mirrors what existing clients sign; revisit before exposing the API to untrusted networks.

use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("The request could not be canonicalized. {0}")]
pub struct CanonicalizationError(pub String);

/// Builds the canonical representation of one request from fields both parties can derive independently.
///
/// The construction is deterministic: identical (method, path, query, body) tuples always produce identical strings,
/// and any difference in those fields produces a different string.
pub fn canonical_representation(
    method: &str,
    path: &str,
    query: &str,
    body: &[u8],
) -> Result<String, CanonicalizationError> {
    match method {
        "GET" | "HEAD" | "DELETE" => Ok(format!("{method}\n{path}\n{query}")),
        "POST" | "PUT" | "PATCH" => {
            let digest = Sha256::digest(body);
            Ok(format!("{method}\n{path}\n{}", hex::encode(digest)))
        },
        m => Err(CanonicalizationError(format!("Requests with method {m} cannot be signed"))),
    }
}

#[cfg(test)]
mod test {
    use super::canonical_representation;

    #[test]
    fn bodyless_methods_bind_the_query_string() {
        let repr = canonical_representation("GET", "/admin/purchase-orders", "", b"").unwrap();
        assert_eq!(repr, "GET\n/admin/purchase-orders\n");
        let paged = canonical_representation("GET", "/admin/purchase-orders", "ps=10&pn=2", b"").unwrap();
        assert_eq!(paged, "GET\n/admin/purchase-orders\nps=10&pn=2");
        assert_ne!(repr, paged);
    }

    #[test]
    fn entity_methods_bind_the_body_digest() {
        let a = canonical_representation("POST", "/api/items", "", b"{\"sku\":\"W-1\"}").unwrap();
        let b = canonical_representation("POST", "/api/items", "", b"{\"sku\":\"W-2\"}").unwrap();
        assert_ne!(a, b);
        // sha256 of the empty body
        let empty = canonical_representation("POST", "/api/items", "", b"").unwrap();
        assert_eq!(empty, "POST\n/api/items\ne3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
    }

    #[test]
    fn canonicalization_is_deterministic() {
        let once = canonical_representation("PUT", "/admin/purchase-orders/PO-1", "", b"payload").unwrap();
        let twice = canonical_representation("PUT", "/admin/purchase-orders/PO-1", "", b"payload").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn distinct_requests_have_distinct_representations() {
        let get = canonical_representation("GET", "/api/items", "", b"").unwrap();
        let delete = canonical_representation("DELETE", "/api/items", "", b"").unwrap();
        assert_ne!(get, delete);
        let a = canonical_representation("GET", "/api/items", "a=1", b"").unwrap();
        let b = canonical_representation("GET", "/api/items/a", "1", b"").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn unsigned_methods_are_rejected() {
        assert!(canonical_representation("OPTIONS", "/api/items", "", b"").is_err());
        assert!(canonical_representation("TRACE", "/", "", b"").is_err());
    }
}
