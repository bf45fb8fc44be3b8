use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::auth::client::ProfileClient;
use crate::auth::session::SessionAuth;
use crate::core::config::{Config, PageConfig};
use crate::core::routes::register_routes;
use crate::core::state::AppState;
use crate::page::document::Page;
use crate::page::markup::DEFAULT_SHELL;
use crate::router::router::Router;
use crate::ui::navigation::SharedAppUi;
use crate::ui::readiness::{readiness, ReadySignal};

/// Read the configured shell markup, falling back to the built-in shell
pub fn load_shell_markup(config: &PageConfig) -> Result<String> {
    match &config.template {
        Some(path) => std::fs::read_to_string(path)
            .context(format!("Failed to read page template: {}", path.display())),
        None => Ok(DEFAULT_SHELL.to_string()),
    }
}

/// Build the session against the configured backend
pub fn build_session(config: &Config) -> Result<Arc<SessionAuth>> {
    let client = ProfileClient::new(
        &config.backend.base_url,
        Duration::from_secs(config.backend.request_timeout_secs),
    )
    .context("Failed to create profile client")?;

    info!(profile_url = %client.profile_url(), "Profile client ready");

    let session = SessionAuth::new(
        Arc::new(client),
        Duration::from_secs(config.auth.min_refresh_interval_secs),
    );

    match &config.backend.access_token {
        Some(token) => session.sign_in(token.clone()),
        None => warn!("No access token configured, starting signed out"),
    }

    Ok(Arc::new(session))
}

/// Wire page, router and routes into an `AppState`
///
/// The returned signal belongs to the navigation UI, which publishes itself
/// through it once mounted.
pub fn build_state(
    config: Config,
    session: Arc<SessionAuth>,
) -> Result<(AppState, ReadySignal<SharedAppUi>)> {
    let markup = load_shell_markup(&config.page)?;
    let page = Arc::new(Page::from_markup(config.page.location.clone(), &markup));

    let router = Arc::new(Router::new(page));
    register_routes(&router).context("Failed to register routes")?;

    let (signal, watch) = readiness::<SharedAppUi>();
    let state = AppState::new(config, router, session, watch);

    info!(
        location = %state.page.location(),
        routes = state.router.route_count(),
        links = state.page.links().len(),
        "Page state built"
    );

    Ok((state, signal))
}
