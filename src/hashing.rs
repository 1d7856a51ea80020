//! Hashing - SHA-256 over canonical JSON
//!
//! Stable identifiers for requests and images, independent of key order.

use serde::Serialize;
use serde_json::{to_string, Value};
use sha2::{Digest, Sha256};

use crate::color::ColorPipeline;
use crate::validation::NormalizedRequest;

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    to_string(&sort_value(&v))
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_value(v)))
                    .collect(),
            )
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_value).collect()),
        _ => v.clone(),
    }
}

/// Compute manifest hash
pub fn compute_manifest_hash<T: Serialize>(manifest: &T) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(manifest)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// Everything that determines the output bytes.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestKey<'a> {
    themes: &'a [String],
    agent_ids: &'a [String],
    seed: &'a str,
    width: u32,
    height: u32,
    color_pipeline: ColorPipeline,
}

/// request_hash = sha256(canonical request + ":" + engine_version)
///
/// Notices are excluded; two requests drawing the same pixels share a hash.
pub fn compute_request_hash(
    request: &NormalizedRequest,
    color_pipeline: ColorPipeline,
    engine_version: &str,
) -> Result<String, serde_json::Error> {
    let key = RequestKey {
        themes: &request.themes,
        agent_ids: &request.agent_ids,
        seed: &request.seed,
        width: request.width,
        height: request.height,
        color_pipeline,
    };
    let combined = format!("{}:{}", canonical_json(&key)?, engine_version);
    Ok(sha256_hex(combined.as_bytes()))
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}
