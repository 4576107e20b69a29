//! Session manager - maps browser tokens to server-side session records.
//!
//! Sessions expire after a period of inactivity: every successful
//! [`SessionManager::current_user`] lookup pushes the expiry forward.
//! Login always rotates the token so a handle seen before authentication
//! never becomes an authenticated one.

use chrono::Duration;
use mockable::Clock;
use std::sync::Arc;

use crate::domain::{SessionHandle, SessionRecord, SessionUser};
use crate::errors::AppResult;
use crate::infra::SessionStore;

/// Session lifecycle over a [`SessionStore`] backend.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock + Send + Sync>,
    idle: Duration,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock + Send + Sync>,
        idle: Duration,
    ) -> Self {
        Self { store, clock, idle }
    }

    /// Inactivity window after which a session is dropped.
    pub fn idle(&self) -> Duration {
        self.idle
    }

    /// Start an authenticated session, replacing `prior` if the browser had
    /// one. A redirect target captured before login survives the rotation.
    pub async fn issue(
        &self,
        prior: Option<&SessionHandle>,
        user: SessionUser,
    ) -> AppResult<SessionHandle> {
        let carried = match prior {
            Some(handle) => {
                let record = self.live_record(handle).await?;
                self.store.delete(handle).await?;
                record.and_then(|r| r.redirect_after_login)
            }
            None => None,
        };

        let handle = SessionHandle::generate();
        let record = SessionRecord {
            user: Some(user),
            redirect_after_login: carried,
            expires_at: self.clock.utc() + self.idle,
        };
        self.store.save(&handle, &record, self.idle).await?;

        tracing::debug!("Session issued");
        Ok(handle)
    }

    /// User bound to `handle`, if the session is live and authenticated.
    pub async fn current_user(&self, handle: &SessionHandle) -> AppResult<Option<SessionUser>> {
        let Some(mut record) = self.live_record(handle).await? else {
            return Ok(None);
        };
        let Some(user) = record.user.clone() else {
            return Ok(None);
        };

        record.expires_at = self.clock.utc() + self.idle;
        self.store.save(handle, &record, self.idle).await?;
        Ok(Some(user))
    }

    /// Remember `path` for after login. Reuses the live session behind
    /// `handle`, otherwise starts an anonymous one; the returned handle is
    /// the one the browser must present next. A target that is already
    /// pending is kept.
    pub async fn capture_redirect(
        &self,
        handle: Option<&SessionHandle>,
        path: &str,
    ) -> AppResult<SessionHandle> {
        let existing = match handle {
            Some(handle) => self
                .live_record(handle)
                .await?
                .map(|record| (handle.clone(), record)),
            None => None,
        };

        let expires_at = self.clock.utc() + self.idle;
        let (handle, record) = match existing {
            Some((handle, mut record)) => {
                record
                    .redirect_after_login
                    .get_or_insert_with(|| path.to_string());
                record.expires_at = expires_at;
                (handle, record)
            }
            None => (
                SessionHandle::generate(),
                SessionRecord {
                    user: None,
                    redirect_after_login: Some(path.to_string()),
                    expires_at,
                },
            ),
        };

        self.store.save(&handle, &record, self.idle).await?;
        Ok(handle)
    }

    /// Take the captured redirect target. Returns it at most once, and only
    /// when it is a path on this site.
    pub async fn consume_redirect(&self, handle: &SessionHandle) -> AppResult<Option<String>> {
        let Some(mut record) = self.live_record(handle).await? else {
            return Ok(None);
        };
        let Some(path) = record.redirect_after_login.take() else {
            return Ok(None);
        };

        self.store.save(handle, &record, self.idle).await?;
        Ok(Some(path).filter(|p| is_local_path(p)))
    }

    /// End the session behind `handle`.
    pub async fn invalidate(&self, handle: &SessionHandle) -> AppResult<()> {
        self.store.delete(handle).await?;
        tracing::debug!("Session invalidated");
        Ok(())
    }

    /// Purge expired sessions from backends that keep them around.
    pub async fn sweep(&self) -> AppResult<usize> {
        let purged = self.store.purge_expired(self.clock.utc()).await?;
        if purged > 0 {
            tracing::debug!(purged, "Expired sessions purged");
        }
        Ok(purged)
    }

    /// Check the session backend is reachable.
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }

    /// Load a record, deleting it if it has expired.
    async fn live_record(&self, handle: &SessionHandle) -> AppResult<Option<SessionRecord>> {
        match self.store.load(handle).await? {
            Some(record) if record.is_expired(self.clock.utc()) => {
                self.store.delete(handle).await?;
                Ok(None)
            }
            other => Ok(other),
        }
    }
}

/// Same-site absolute path: starts with `/` but is not protocol-relative.
pub fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::MemorySessionStore;
    use chrono::{DateTime, Local, Utc};
    use std::sync::Mutex;
    use uuid::Uuid;

    struct MutableClock(Mutex<DateTime<Utc>>);

    impl MutableClock {
        fn new() -> Self {
            Self(Mutex::new(Utc::now()))
        }

        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().expect("clock mutex");
            *now += by;
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.0.lock().expect("clock mutex")
        }
    }

    fn alice() -> SessionUser {
        SessionUser {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "a@x.io".to_string(),
        }
    }

    fn manager() -> (SessionManager, Arc<MutableClock>, Arc<MemorySessionStore>) {
        let clock = Arc::new(MutableClock::new());
        let store = Arc::new(MemorySessionStore::new());
        let manager = SessionManager::new(store.clone(), clock.clone(), Duration::minutes(30));
        (manager, clock, store)
    }

    #[tokio::test]
    async fn test_issue_then_current_user() {
        let (sessions, _, _) = manager();
        let handle = sessions.issue(None, alice()).await.unwrap();

        let user = sessions.current_user(&handle).await.unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "a@x.io");
    }

    #[tokio::test]
    async fn test_unknown_handle_has_no_user() {
        let (sessions, _, _) = manager();
        let handle = SessionHandle::from_token("nope");
        assert!(sessions.current_user(&handle).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_issue_replaces_prior_session() {
        let (sessions, _, store) = manager();
        let first = sessions.issue(None, alice()).await.unwrap();
        let second = sessions.issue(Some(&first), alice()).await.unwrap();

        assert_ne!(first, second);
        assert!(sessions.current_user(&first).await.unwrap().is_none());
        assert!(sessions.current_user(&second).await.unwrap().is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_session_expires_after_idle_window() {
        let (sessions, clock, store) = manager();
        let handle = sessions.issue(None, alice()).await.unwrap();

        clock.advance(Duration::minutes(31));
        assert!(sessions.current_user(&handle).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_activity_slides_expiry() {
        let (sessions, clock, _) = manager();
        let handle = sessions.issue(None, alice()).await.unwrap();

        clock.advance(Duration::minutes(20));
        assert!(sessions.current_user(&handle).await.unwrap().is_some());
        clock.advance(Duration::minutes(20));
        assert!(sessions.current_user(&handle).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_redirect_survives_login_and_is_consumed_once() {
        let (sessions, _, _) = manager();
        let anonymous = sessions.capture_redirect(None, "/profile").await.unwrap();
        assert!(sessions.current_user(&anonymous).await.unwrap().is_none());

        let handle = sessions.issue(Some(&anonymous), alice()).await.unwrap();
        assert_eq!(
            sessions.consume_redirect(&handle).await.unwrap().as_deref(),
            Some("/profile")
        );
        assert!(sessions.consume_redirect(&handle).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_capture_reuses_live_session_and_keeps_pending_target() {
        let (sessions, _, store) = manager();
        let first = sessions.capture_redirect(None, "/home").await.unwrap();
        let second = sessions.capture_redirect(Some(&first), "/pet").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.len().await, 1);
        assert_eq!(
            sessions.consume_redirect(&second).await.unwrap().as_deref(),
            Some("/home")
        );
    }

    #[tokio::test]
    async fn test_capture_after_consume_sets_new_target() {
        let (sessions, _, _) = manager();
        let handle = sessions.capture_redirect(None, "/home").await.unwrap();
        sessions.consume_redirect(&handle).await.unwrap();

        sessions.capture_redirect(Some(&handle), "/pet").await.unwrap();
        assert_eq!(
            sessions.consume_redirect(&handle).await.unwrap().as_deref(),
            Some("/pet")
        );
    }

    #[tokio::test]
    async fn test_offsite_redirect_is_dropped() {
        let (sessions, _, _) = manager();
        let handle = sessions
            .capture_redirect(None, "//evil.example/phish")
            .await
            .unwrap();

        assert!(sessions.consume_redirect(&handle).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalidate_and_sweep() {
        let (sessions, clock, store) = manager();
        let kept = sessions.issue(None, alice()).await.unwrap();
        let dropped = sessions.issue(None, alice()).await.unwrap();
        sessions.capture_redirect(None, "/home").await.unwrap();

        sessions.invalidate(&dropped).await.unwrap();
        assert!(sessions.current_user(&dropped).await.unwrap().is_none());
        assert_eq!(store.len().await, 2);

        clock.advance(Duration::minutes(31));
        assert_eq!(sessions.sweep().await.unwrap(), 2);
        assert!(sessions.current_user(&kept).await.unwrap().is_none());
    }

    #[test]
    fn test_is_local_path() {
        assert!(is_local_path("/profile?tab=pets"));
        assert!(!is_local_path("//evil.example"));
        assert!(!is_local_path("/\\evil.example"));
        assert!(!is_local_path("https://evil.example"));
        assert!(!is_local_path(""));
    }
}
