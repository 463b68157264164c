// src/app/session.rs
use std::fs;
use std::io::{self, ErrorKind};
use std::path::PathBuf;

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde_json::Value;
use tracing::warn;

pub const SESSION_FILE: &str = "session_token";
pub const DEFAULT_DISPLAY_NAME: &str = "Usuário";

/// Bearer token persisted between runs.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store under the app cache directory.
    pub fn in_cache_dir() -> Self {
        Self::new(crate::app::cache::cache_dir().join(SESSION_FILE))
    }

    pub fn load(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(txt) => {
                let token = txt.trim();
                if token.is_empty() {
                    None
                } else {
                    Some(token.to_string())
                }
            }
            Err(err) => {
                if err.kind() != ErrorKind::NotFound {
                    warn!("Failed to read session {}: {err}", self.path.display());
                }
                None
            }
        }
    }

    pub fn save(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, token.trim())?;
        fs::rename(tmp, &self.path)
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

/// Best-effort read of `username` from a JWT payload. Display only; the
/// backend stays the authority on who the token belongs to.
pub fn username_hint(token: &str) -> Option<String> {
    let payload = token.split('.').nth(1)?;
    let trimmed = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(trimmed)
        .or_else(|_| STANDARD.decode(payload))
        .ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    claims
        .get("username")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub fn display_name(token: Option<&str>) -> String {
    token
        .and_then(username_hint)
        .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(claims: &str) -> String {
        format!(
            "{}.{}.sig",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(claims)
        )
    }

    #[test]
    fn save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("nested").join(SESSION_FILE));
        assert_eq!(store.load(), None);

        store.save("abc.def.ghi\n").unwrap();
        assert_eq!(store.load().as_deref(), Some("abc.def.ghi"));

        store.clear().unwrap();
        assert_eq!(store.load(), None);
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn decodes_username_claim() {
        let token = jwt(r#"{"id":3,"username":"marina"}"#);
        assert_eq!(username_hint(&token).as_deref(), Some("marina"));
        assert_eq!(display_name(Some(&token)), "marina");
    }

    #[test]
    fn falls_back_for_opaque_tokens() {
        assert_eq!(username_hint("not-a-jwt"), None);
        assert_eq!(username_hint("a.%%%.c"), None);
        assert_eq!(display_name(Some(&jwt(r#"{"sub":"1"}"#))), DEFAULT_DISPLAY_NAME);
        assert_eq!(display_name(None), DEFAULT_DISPLAY_NAME);
    }
}
