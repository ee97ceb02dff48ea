//! The token bundle and its byte encoding.
//!
//! A bundle is stored as compact JSON.  Optional fields that are absent
//! are omitted entirely, so a bundle without a refresh token decodes back
//! to `None` rather than an empty string.

use serde::{Deserialize, Serialize};

use crate::errors::{NucError, Result};

/// Credential material returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBundle {
    /// Opaque bearer credential sent on every API call.
    pub access_token: String,

    /// Opaque refresh credential; only newer servers issue one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Unix timestamp (seconds) after which the access token is stale.
    ///
    /// Advisory only: the vault never checks it, the session layer does.
    /// Older token files call this field `expiration`.
    #[serde(alias = "expiration")]
    pub expires_at: i64,

    /// Human-readable greeting from the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl TokenBundle {
    pub fn new(access_token: impl Into<String>, expires_at: i64) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at,
            message: None,
        }
    }

    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// `true` once `now` has passed `expires_at`.
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at < now
    }

    /// A copy of this bundle with a new expiry.
    pub fn renewed(&self, expires_at: i64) -> Self {
        Self {
            expires_at,
            ..self.clone()
        }
    }
}

/// Encode a bundle as bytes.
///
/// Every `TokenBundle` is representable, so this only fails if the JSON
/// writer itself fails.
pub fn serialize(bundle: &TokenBundle) -> Result<Vec<u8>> {
    serde_json::to_vec(bundle).map_err(|e| NucError::Decode(format!("encoding bundle: {e}")))
}

/// Decode bytes produced by `serialize`.
///
/// Rejects malformed JSON, a missing `access_token`, and an empty one.
pub fn deserialize(bytes: &[u8]) -> Result<TokenBundle> {
    let bundle: TokenBundle =
        serde_json::from_slice(bytes).map_err(|e| NucError::Decode(e.to_string()))?;

    if bundle.access_token.is_empty() {
        return Err(NucError::Decode("access_token is empty".into()));
    }

    Ok(bundle)
}
