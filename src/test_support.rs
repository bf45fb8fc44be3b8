//! Fakes shared by unit tests across modules.

use crate::auth::ProfileSource;
use crate::core::error::AuthError;
use crate::models::user::User;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Clone)]
enum Scripted {
    Profile(User),
    Status(u16),
    Unauthorized,
}

/// Profile source replaying scripted responses; the last one repeats
pub struct ScriptedProfiles {
    script: Mutex<VecDeque<Scripted>>,
    delay: Duration,
    fetches: AtomicUsize,
}

impl ScriptedProfiles {
    fn from_script(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            delay: Duration::ZERO,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn always(user: User) -> Self {
        Self::from_script(vec![Scripted::Profile(user)])
    }

    pub fn sequence(users: Vec<User>) -> Self {
        Self::from_script(users.into_iter().map(Scripted::Profile).collect())
    }

    pub fn failing(status: u16) -> Self {
        Self::from_script(vec![Scripted::Status(status)])
    }

    pub fn unauthorized() -> Self {
        Self::from_script(vec![Scripted::Unauthorized])
    }

    /// Delay every fetch, in tokio time
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    fn next(&self) -> Scripted {
        let mut script = self.script.lock();
        if script.len() > 1 {
            script.pop_front().expect("script is non-empty")
        } else {
            script.front().cloned().expect("script is non-empty")
        }
    }
}

#[async_trait]
impl ProfileSource for ScriptedProfiles {
    async fn fetch_profile(&self, _token: &str) -> Result<User, AuthError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let response = self.next();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match response {
            Scripted::Profile(user) => Ok(user),
            Scripted::Status(status) => Err(AuthError::Status(status)),
            Scripted::Unauthorized => Err(AuthError::Unauthorized),
        }
    }
}
