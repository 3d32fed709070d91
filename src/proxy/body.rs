//! Upstream body classification.
//!
//! A body declared as JSON is checked for well-formedness so it can be
//! logged and labelled as such, but the bytes returned to the caller are
//! always the backend's bytes. Nothing is re-encoded.

use axum::body::Bytes;
use axum::http::{header, HeaderMap};
use serde::de::IgnoredAny;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamBody {
    /// Declared and well-formed JSON.
    Json(Bytes),
    /// Anything else, including JSON-declared bodies that fail to parse.
    Raw(Bytes),
}

impl UpstreamBody {
    pub fn classify(headers: &HeaderMap, bytes: Bytes) -> Self {
        if declares_json(headers) {
            if bytes.is_empty() || serde_json::from_slice::<IgnoredAny>(&bytes).is_ok() {
                return UpstreamBody::Json(bytes);
            }
            tracing::debug!(len = bytes.len(), "Upstream body declared JSON but did not parse; passing raw");
        }
        UpstreamBody::Raw(bytes)
    }

    pub fn is_json(&self) -> bool {
        matches!(self, UpstreamBody::Json(_))
    }

    pub fn bytes(&self) -> &Bytes {
        match self {
            UpstreamBody::Json(b) | UpstreamBody::Raw(b) => b,
        }
    }

    pub fn into_bytes(self) -> Bytes {
        match self {
            UpstreamBody::Json(b) | UpstreamBody::Raw(b) => b,
        }
    }
}

fn declares_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| {
            let essence = ct.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
            essence == "application/json" || essence.ends_with("+json")
        })
        .unwrap_or(false)
}
