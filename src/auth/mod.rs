pub mod client;
pub mod session;

use crate::core::error::AuthError;
use crate::models::user::User;
use async_trait::async_trait;
use std::sync::Arc;

/// Authentication state as the page sees it
#[async_trait]
pub trait AuthModule: Send + Sync {
    fn is_authenticated(&self) -> bool;

    /// Re-fetch the user profile
    ///
    /// `force` bypasses the freshness window; `silent` keeps failures out of
    /// user-facing log levels.
    async fn refresh_user_data(&self, force: bool, silent: bool) -> Result<(), AuthError>;

    fn current_user(&self) -> Option<Arc<User>>;
}

/// Where profiles come from
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self, token: &str) -> Result<User, AuthError>;
}
