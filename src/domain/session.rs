//! Session handle and the record stored behind it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::SessionUser;

/// Opaque token identifying a browser's session.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionHandle(String);

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionHandle").field(&"[REDACTED]").finish()
    }
}

impl SessionHandle {
    /// 244 random bits from two v4 UUIDs.
    pub fn generate() -> Self {
        Self(format!(
            "{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        ))
    }

    /// Wrap a token received from the browser.
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Server-side session state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// `None` for anonymous sessions that only hold a redirect target.
    pub user: Option<SessionUser>,
    /// Path to resume after login; read once, then cleared.
    pub redirect_after_login: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_generated_handles_are_unique() {
        let first = SessionHandle::generate();
        let second = SessionHandle::generate();

        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 64);
    }

    #[test]
    fn test_handle_debug_is_redacted() {
        let handle = SessionHandle::from_token("abc123");
        assert!(!format!("{:?}", handle).contains("abc123"));
    }

    #[test]
    fn test_expiry_boundary() {
        let now = Utc::now();
        let record = SessionRecord {
            user: None,
            redirect_after_login: None,
            expires_at: now,
        };

        assert!(record.is_expired(now));
        assert!(!record.is_expired(now - Duration::seconds(1)));
    }
}
