use crate::core::error::ReadinessError;
use std::time::Duration;

/// A feature that ended up unavailable during bootstrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// The profile refresh was rejected; the nav may show stale or no data
    RefreshFailed(String),
    /// The navigation UI never became ready within the bound
    UiUnavailable(ReadinessError),
    /// UI ready but no user to show
    NoUser,
}

/// What one bootstrap run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    /// This run initialized the router
    pub router_initialized: bool,
    /// Link delegation had to be attached after router init
    pub delegation_repaired: bool,
    /// A forced profile refresh completed successfully
    pub profile_refreshed: bool,
    /// `create_user_navigation` was called
    pub navigation_rendered: bool,
    pub degradations: Vec<Degradation>,
    pub elapsed: Duration,
}

impl BootstrapReport {
    pub fn is_degraded(&self) -> bool {
        !self.degradations.is_empty()
    }
}
