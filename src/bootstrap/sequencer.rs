use crate::bootstrap::report::{BootstrapReport, Degradation};
use crate::core::config::ReadinessStrategy;
use crate::core::error::ReadinessError;
use crate::core::state::AppState;
use crate::ui::navigation::SharedAppUi;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Startup orchestration run once per page load
///
/// Steps run strictly in order: router, link delegation, profile refresh,
/// UI readiness, navigation render. Every wait is bounded and every failure
/// is recorded in the report instead of aborting the page.
pub struct BootstrapSequencer {
    state: AppState,
}

impl BootstrapSequencer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub async fn run(&self) -> BootstrapReport {
        let started = Instant::now();
        let bootstrap = &self.state.config.bootstrap;
        let mut report = BootstrapReport::default();

        report.router_initialized = self.state.router.init(bootstrap.skip_initial_dispatch);
        report.delegation_repaired = self.state.router.ensure_link_delegation();

        if self.state.auth.is_authenticated() {
            match self.state.auth.refresh_user_data(true, false).await {
                Ok(()) => report.profile_refreshed = true,
                Err(e) => {
                    warn!(error = %e, "Profile refresh failed during bootstrap");
                    report.degradations.push(Degradation::RefreshFailed(e.to_string()));
                }
            }
        } else {
            debug!("Not authenticated, skipping profile refresh");
        }

        match self.wait_for_ui().await {
            Ok(ui) => {
                // Read the user only now, after the refresh has resolved
                match self.state.auth.current_user() {
                    Some(user) => {
                        ui.create_user_navigation(&user);
                        report.navigation_rendered = true;
                    }
                    None => {
                        debug!("No current user, leaving navigation anonymous");
                        report.degradations.push(Degradation::NoUser);
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Navigation UI unavailable, skipping user navigation");
                report.degradations.push(Degradation::UiUnavailable(e));
            }
        }

        report.elapsed = started.elapsed();
        info!(
            elapsed_ms = report.elapsed.as_millis() as u64,
            profile_refreshed = report.profile_refreshed,
            navigation_rendered = report.navigation_rendered,
            degradations = report.degradations.len(),
            "Bootstrap complete"
        );
        report
    }

    async fn wait_for_ui(&self) -> Result<SharedAppUi, ReadinessError> {
        let bootstrap = &self.state.config.bootstrap;
        match bootstrap.readiness {
            ReadinessStrategy::Signal => self.state.ui.wait(bootstrap.ui_ready_timeout()).await,
            ReadinessStrategy::Poll => {
                self.state
                    .ui
                    .poll(
                        bootstrap.settle_delay(),
                        bootstrap.poll_attempts,
                        bootstrap.poll_interval(),
                    )
                    .await
            }
        }
    }
}
