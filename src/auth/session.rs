use crate::auth::{AuthModule, ProfileSource};
use crate::core::error::AuthError;
use crate::models::user::User;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Session holding the one authoritative user for this page
pub struct SessionAuth {
    source: Arc<dyn ProfileSource>,
    token: RwLock<Option<String>>,
    // Bumped under the token lock on every sign-in and sign-out
    generation: AtomicU64,
    user: RwLock<Option<Arc<User>>>,
    refreshed_at: RwLock<Option<Instant>>,
    min_refresh_interval: Duration,
}

impl SessionAuth {
    pub fn new(source: Arc<dyn ProfileSource>, min_refresh_interval: Duration) -> Self {
        Self {
            source,
            token: RwLock::new(None),
            generation: AtomicU64::new(0),
            user: RwLock::new(None),
            refreshed_at: RwLock::new(None),
            min_refresh_interval,
        }
    }

    pub fn sign_in(&self, token: impl Into<String>) {
        let mut slot = self.token.write();
        *slot = Some(token.into());
        self.generation.fetch_add(1, Ordering::AcqRel);
        drop(slot);
        info!("Session signed in");
    }

    /// Seed a user already known to the page, such as one embedded in the
    /// server-rendered shell. It counts as stale until refreshed.
    pub fn seed_user(&self, user: User) {
        *self.user.write() = Some(Arc::new(user));
    }

    pub fn sign_out(&self) {
        let mut slot = self.token.write();
        slot.take();
        self.generation.fetch_add(1, Ordering::AcqRel);
        drop(slot);
        self.user.write().take();
        self.refreshed_at.write().take();
        info!("Session signed out");
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    fn is_fresh(&self) -> bool {
        let has_user = self.user.read().is_some();
        let refreshed_at = *self.refreshed_at.read();
        has_user
            && refreshed_at.is_some_and(|at| at.elapsed() < self.min_refresh_interval)
    }
}

#[async_trait]
impl AuthModule for SessionAuth {
    fn is_authenticated(&self) -> bool {
        self.token.read().is_some()
    }

    async fn refresh_user_data(&self, force: bool, silent: bool) -> Result<(), AuthError> {
        let (token, generation) = {
            let slot = self.token.read();
            let token = slot.clone().ok_or(AuthError::NotAuthenticated)?;
            (token, self.generation.load(Ordering::Acquire))
        };

        if !force && self.is_fresh() {
            debug!("Profile still fresh, skipping refresh");
            return Ok(());
        }

        let fetched = self.source.fetch_profile(&token).await;

        // A sign-in or sign-out while the fetch was in flight owns the
        // session now; this result belongs to the old one.
        if !self.is_current(generation) {
            debug!("Session changed during profile refresh, discarding result");
            return Err(AuthError::SessionChanged);
        }

        match fetched {
            Ok(user) => {
                info!(
                    user_id = %user.id,
                    credits = user.credits,
                    "User profile refreshed"
                );
                *self.user.write() = Some(Arc::new(user));
                *self.refreshed_at.write() = Some(Instant::now());
                Ok(())
            }
            Err(AuthError::Unauthorized) => {
                if silent {
                    debug!("Session token rejected, signing out");
                } else {
                    warn!("Session token rejected, signing out");
                }
                self.sign_out();
                Err(AuthError::Unauthorized)
            }
            Err(e) => {
                if silent {
                    debug!(error = %e, "Silent profile refresh failed");
                } else {
                    warn!(error = %e, "Profile refresh failed");
                }
                Err(e)
            }
        }
    }

    fn current_user(&self) -> Option<Arc<User>> {
        self.user.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedProfiles;

    fn session(source: Arc<ScriptedProfiles>) -> SessionAuth {
        SessionAuth::new(source, Duration::from_secs(30))
    }

    #[tokio::test]
    async fn test_refresh_requires_session() {
        let source = Arc::new(ScriptedProfiles::always(User::new("u-1", "Alice", 1)));
        let auth = session(source.clone());

        assert!(!auth.is_authenticated());
        let result = auth.refresh_user_data(true, false).await;

        assert!(matches!(result, Err(AuthError::NotAuthenticated)));
        assert_eq!(source.fetches(), 0);
    }

    #[tokio::test]
    async fn test_forced_refresh_replaces_stale_user() {
        let source = Arc::new(ScriptedProfiles::always(User::new("u-1", "Alice", 50)));
        let auth = session(source);
        auth.sign_in("token");
        auth.seed_user(User::new("u-1", "OldNick", 10));

        let before = auth.current_user().unwrap();
        auth.refresh_user_data(true, false).await.unwrap();
        let after = auth.current_user().unwrap();

        assert_eq!(before.display_name, "OldNick");
        assert_eq!(after.display_name, "Alice");
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[tokio::test]
    async fn test_unforced_refresh_uses_fresh_profile() {
        let source = Arc::new(ScriptedProfiles::always(User::new("u-1", "Alice", 1)));
        let auth = session(source.clone());
        auth.sign_in("token");

        auth.refresh_user_data(false, true).await.unwrap();
        auth.refresh_user_data(false, true).await.unwrap();
        assert_eq!(source.fetches(), 1);

        auth.refresh_user_data(true, true).await.unwrap();
        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unforced_refresh_after_interval_fetches() {
        let source = Arc::new(ScriptedProfiles::always(User::new("u-1", "Alice", 1)));
        let auth = session(source.clone());
        auth.sign_in("token");

        auth.refresh_user_data(false, false).await.unwrap();
        tokio::time::advance(Duration::from_secs(31)).await;
        auth.refresh_user_data(false, false).await.unwrap();

        assert_eq!(source.fetches(), 2);
    }

    #[tokio::test]
    async fn test_seeded_user_is_not_fresh() {
        let source = Arc::new(ScriptedProfiles::always(User::new("u-1", "Alice", 1)));
        let auth = session(source.clone());
        auth.sign_in("token");
        auth.seed_user(User::new("u-1", "Old", 0));

        auth.refresh_user_data(false, false).await.unwrap();
        assert_eq!(source.fetches(), 1);
    }

    #[tokio::test]
    async fn test_latest_refresh_wins() {
        let source = Arc::new(ScriptedProfiles::sequence(vec![
            User::new("u-1", "Alice", 10),
            User::new("u-1", "Alice B.", 25),
        ]));
        let auth = session(source);
        auth.sign_in("token");

        auth.refresh_user_data(true, false).await.unwrap();
        let first = auth.current_user().unwrap();
        auth.refresh_user_data(true, false).await.unwrap();

        assert_eq!(first.display_name, "Alice");
        assert_eq!(auth.current_user().unwrap().display_name, "Alice B.");
        assert_eq!(auth.current_user().unwrap().credits, 25);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_user() {
        let source = Arc::new(ScriptedProfiles::failing(503));
        let auth = session(source);
        auth.sign_in("token");
        auth.seed_user(User::new("u-1", "Old", 0));

        let result = auth.refresh_user_data(true, false).await;

        assert!(matches!(result, Err(AuthError::Status(503))));
        assert!(auth.is_authenticated());
        assert_eq!(auth.current_user().unwrap().display_name, "Old");
    }

    #[tokio::test]
    async fn test_unauthorized_signs_out() {
        let source = Arc::new(ScriptedProfiles::unauthorized());
        let auth = session(source);
        auth.sign_in("expired");
        auth.seed_user(User::new("u-1", "Old", 0));

        let result = auth.refresh_user_data(true, false).await;

        assert!(matches!(result, Err(AuthError::Unauthorized)));
        assert!(!auth.is_authenticated());
        assert!(auth.current_user().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_out_during_refresh_discards_profile() {
        let source = Arc::new(
            ScriptedProfiles::always(User::new("u-1", "Alice", 1))
                .with_delay(Duration::from_millis(300)),
        );
        let auth = Arc::new(session(source));
        auth.sign_in("token");

        let refreshing = Arc::clone(&auth);
        let refresh = tokio::spawn(async move { refreshing.refresh_user_data(true, false).await });
        tokio::time::sleep(Duration::from_millis(100)).await;
        auth.sign_out();

        let result = refresh.await.unwrap();

        assert!(matches!(result, Err(AuthError::SessionChanged)));
        assert!(!auth.is_authenticated());
        assert!(auth.current_user().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejection_for_old_session_keeps_new_one() {
        let source = Arc::new(ScriptedProfiles::unauthorized().with_delay(Duration::from_millis(300)));
        let auth = Arc::new(session(source));
        auth.sign_in("expired");

        let refreshing = Arc::clone(&auth);
        let refresh = tokio::spawn(async move { refreshing.refresh_user_data(true, true).await });
        tokio::time::sleep(Duration::from_millis(100)).await;
        auth.sign_in("renewed");
        auth.seed_user(User::new("u-1", "Alice", 1));

        let result = refresh.await.unwrap();

        assert!(matches!(result, Err(AuthError::SessionChanged)));
        assert!(auth.is_authenticated());
        assert_eq!(auth.current_user().unwrap().display_name, "Alice");
    }

    #[tokio::test]
    async fn test_silent_unauthorized_still_signs_out() {
        let source = Arc::new(ScriptedProfiles::unauthorized());
        let auth = session(source);
        auth.sign_in("expired");

        let result = auth.refresh_user_data(true, true).await;

        assert!(matches!(result, Err(AuthError::Unauthorized)));
        assert!(!auth.is_authenticated());
    }
}
