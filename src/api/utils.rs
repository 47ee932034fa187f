use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use http::request::Parts;

/// Who is calling, for rate limiting. Proxies set `x-forwarded-for`
/// (first entry is the original client) or `x-real-ip`, otherwise the
/// peer address is used.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientIdentifier(pub String);

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl<S> FromRequestParts<S> for ClientIdentifier
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = header_value(parts, "x-forwarded-for")
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        let client = forwarded
            .or_else(|| header_value(parts, "x-real-ip"))
            .map(String::from)
            .or_else(|| {
                parts
                    .extensions
                    .get::<ConnectInfo<SocketAddr>>()
                    .map(|ConnectInfo(addr)| addr.ip().to_string())
            })
            .unwrap_or_else(|| "unknown".to_string());

        Ok(ClientIdentifier(client))
    }
}
