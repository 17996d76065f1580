use http::HeaderMap;

pub const UNKNOWN_CLIENT: &str = "unknown";

/// Throttle identity of the caller: the edge-assigned address, then the first
/// forwarded-for hop, then the real-ip header.
pub fn client_key(headers: &HeaderMap) -> String {
    header_str(headers, "cf-connecting-ip")
        .or_else(|| {
            header_str(headers, "x-forwarded-for")
                .and_then(|value| value.split(',').next())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        })
        .or_else(|| header_str(headers, "x-real-ip"))
        .map(str::to_string)
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
