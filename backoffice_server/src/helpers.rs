use std::{net::IpAddr, str::FromStr};

use actix_web::HttpRequest;
use log::trace;
use regex::Regex;

/// Determine the remote IP address of the request, for audit logging of authentication failures.
///
/// When the server sits behind a reverse proxy, the connection peer is the proxy, so the `X-Forwarded-For` and
/// `Forwarded` headers can be consulted instead. Both are trivially spoofable by a direct client, which is why each
/// source must be opted into via configuration. The order of preference is `X-Forwarded-For`, then `Forwarded`, then
/// the connection's peer address.
pub fn get_remote_ip(req: &HttpRequest, use_x_forwarded_for: bool, use_forwarded: bool) -> Option<IpAddr> {
    if use_x_forwarded_for {
        let forwarded_for =
            req.headers().get("X-Forwarded-For").and_then(|v| v.to_str().ok()).and_then(|s| IpAddr::from_str(s).ok());
        if let Some(ip) = forwarded_for {
            trace!("Using X-Forwarded-For header for remote address: {ip}");
            return Some(ip);
        }
    }
    if use_forwarded {
        let re = Regex::new(r#"for=(?P<ip>[^;]+)"#).unwrap();
        let forwarded = req
            .headers()
            .get("Forwarded")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| re.captures(v))
            .and_then(|caps| caps.name("ip"))
            .and_then(|m| IpAddr::from_str(m.as_str()).ok());
        if let Some(ip) = forwarded {
            trace!("Using Forwarded header for remote address: {ip}");
            return Some(ip);
        }
    }
    req.connection_info().peer_addr().and_then(|addr| IpAddr::from_str(addr).ok())
}
