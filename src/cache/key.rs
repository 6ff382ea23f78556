//! Cache key generation using SHA-256 hashes

use sha2::{Digest, Sha256};

/// Generate a deterministic cache key from an endpoint and its parameters.
///
/// Parameters are sorted before hashing so the same request built in a
/// different order maps to the same entry.
pub fn cache_key(endpoint: &str, params: &[(&str, &str)]) -> String {
    let mut hasher = Sha256::new();

    hasher.update(endpoint.as_bytes());
    hasher.update(b"|");

    let mut sorted_params: Vec<_> = params.iter().collect();
    sorted_params.sort_by(|a, b| a.0.cmp(b.0).then(a.1.cmp(b.1)));

    for (k, v) in sorted_params {
        hasher.update(k.as_bytes());
        hasher.update(b"=");
        hasher.update(v.as_bytes());
        hasher.update(b"&");
    }

    format!("{:x}", hasher.finalize())
}

/// Key for a JSON request body, e.g. a vulnerability search filter set.
pub fn body_key(endpoint: &str, body: &serde_json::Value) -> String {
    let rendered = body.to_string();
    cache_key(endpoint, &[("body", rendered.as_str())])
}
