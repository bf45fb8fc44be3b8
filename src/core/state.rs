// Application state (AppState)

use crate::auth::AuthModule;
use crate::core::config::Config;
use crate::page::document::Page;
use crate::router::router::Router;
use crate::ui::navigation::SharedAppUi;
use crate::ui::readiness::ReadyWatch;
use std::sync::Arc;

/// Services for one page load
///
/// Built once at startup and handed to whatever needs them; nothing in the
/// crate reaches for a global.
#[derive(Clone)]
pub struct AppState {
    /// The document being driven
    pub page: Arc<Page>,

    /// Client-side router bound to `page`
    pub router: Arc<Router>,

    /// Authentication session
    pub auth: Arc<dyn AuthModule>,

    /// Resolves once the navigation UI has mounted
    pub ui: ReadyWatch<SharedAppUi>,

    /// Configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        config: Config,
        router: Arc<Router>,
        auth: Arc<dyn AuthModule>,
        ui: ReadyWatch<SharedAppUi>,
    ) -> Self {
        Self {
            page: Arc::clone(router.page()),
            router,
            auth,
            ui,
            config: Arc::new(config),
        }
    }
}
