// src/auth/mod.rs — Local credential store
//
// The OAuth handshake itself happens elsewhere (the hosted sign-in page);
// this store only holds the resulting bearer credential in
// ~/.decora/auth.json. Backend calls without a usable credential are a
// hard AuthRequired error, never a silent anonymous request.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::infra::errors::DecoraError;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthStore {
    #[serde(default)]
    pub credential: Option<Credential>,
}

/// A bearer credential: a long-lived API token, or an OAuth access token
/// with its refresh token and expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credential {
    ApiToken {
        token: String,
    },
    #[serde(rename = "oauth")]
    OAuth {
        access_token: String,
        refresh_token: String,
        /// Unix timestamp (seconds). 0 means "never expires".
        expires_at: u64,
    },
}

impl AuthStore {
    /// Load from disk; a missing file is an empty store.
    pub fn load() -> Result<Self> {
        let path = paths::auth_file_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Persist to disk (owner-only permissions on Unix).
    pub fn save(&self) -> Result<()> {
        let path = paths::auth_file_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    pub fn set_api_token(&mut self, token: impl Into<String>) {
        self.credential = Some(Credential::ApiToken {
            token: token.into(),
        });
    }

    /// The bearer token to attach to backend calls. Absent or expired
    /// credentials are an AuthRequired error.
    pub fn bearer_token(&self) -> Result<String, DecoraError> {
        match &self.credential {
            Some(Credential::ApiToken { token }) => Ok(token.clone()),
            Some(Credential::OAuth {
                access_token,
                expires_at,
                ..
            }) => {
                let now = chrono::Utc::now().timestamp().max(0) as u64;
                if *expires_at != 0 && now >= *expires_at {
                    return Err(DecoraError::AuthRequired);
                }
                Ok(access_token.clone())
            }
            None => Err(DecoraError::AuthRequired),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.bearer_token().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_is_auth_required() {
        let store = AuthStore::default();
        assert!(store.bearer_token().unwrap_err().is_auth());
        assert!(!store.is_signed_in());
    }

    #[test]
    fn test_api_token_round_trip() {
        let mut store = AuthStore::default();
        store.set_api_token("tok-123");
        assert_eq!(store.bearer_token().unwrap(), "tok-123");

        let json = serde_json::to_string(&store).unwrap();
        let parsed: AuthStore = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.bearer_token().unwrap(), "tok-123");
    }

    #[test]
    fn test_expired_oauth_is_auth_required() {
        let store = AuthStore {
            credential: Some(Credential::OAuth {
                access_token: "at".into(),
                refresh_token: "rt".into(),
                expires_at: 1, // 1970: long expired
            }),
        };
        assert!(store.bearer_token().unwrap_err().is_auth());
    }

    #[test]
    fn test_zero_expiry_never_expires() {
        let store = AuthStore {
            credential: Some(Credential::OAuth {
                access_token: "at".into(),
                refresh_token: "rt".into(),
                expires_at: 0,
            }),
        };
        assert_eq!(store.bearer_token().unwrap(), "at");
    }
}
