use crate::core::error::NavigationError;
use crate::models::link::NavigationLink;
use crate::page::document::{Page, PageListener};
use crate::router::route::{normalize_path, same_location, Route, RouteContext, RoutePattern};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// Result of a navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigateOutcome {
    /// A route matched and its handler ran
    Dispatched { pattern: String },
    /// Already at this path; nothing happened
    Unchanged,
    /// History and current path moved but no route matched
    NoRoute,
    /// The path was not an in-app path; nothing happened
    Rejected,
}

/// Client-side router owning the route table and current path
pub struct Router {
    page: Arc<Page>,
    routes: RwLock<Vec<Route>>,
    current_path: RwLock<Option<String>>,
    initialized: AtomicBool,
}

impl Router {
    pub fn new(page: Arc<Page>) -> Self {
        Self {
            page,
            routes: RwLock::new(Vec::new()),
            current_path: RwLock::new(None),
            initialized: AtomicBool::new(false),
        }
    }

    pub fn page(&self) -> &Arc<Page> {
        &self.page
    }

    /// Register a route; registration order is match priority
    pub fn route<F>(&self, pattern: &str, handler: F) -> Result<(), NavigationError>
    where
        F: Fn(&RouteContext) + Send + Sync + 'static,
    {
        let pattern = RoutePattern::parse(pattern)?;
        debug!(pattern = %pattern, "Route registered");
        self.routes.write().push(Route {
            pattern,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    pub fn route_count(&self) -> usize {
        self.routes.read().len()
    }

    pub fn current_path(&self) -> Option<String> {
        self.current_path.read().clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Start listening for link clicks and back/forward moves
    ///
    /// Adopts the page location as the current path. With
    /// `skip_initial_dispatch` the server-rendered view is left alone;
    /// otherwise the route for the location fires once. Returns false when
    /// the router was already initialized.
    pub fn init(self: &Arc<Self>, skip_initial_dispatch: bool) -> bool {
        if self.initialized.swap(true, Ordering::AcqRel) {
            warn!("Router already initialized, ignoring repeated init");
            return false;
        }

        let attached = self.attach();
        let location = self.page.location();
        *self.current_path.write() = Some(location.clone());

        info!(
            location = %location,
            skip_initial_dispatch,
            delegation_attached = attached,
            "Router initialized"
        );

        if !skip_initial_dispatch {
            self.dispatch(&location);
        }

        true
    }

    /// Make sure the page delegates link clicks to this router
    ///
    /// Returns true when the router's listener had to be attached. Other
    /// listeners on the page do not count. The page holds each listener
    /// once, so this never causes double handling.
    pub fn ensure_link_delegation(self: &Arc<Self>) -> bool {
        if self.page.is_listening(&self.listener_handle()) {
            return false;
        }
        let attached = self.attach();
        if attached {
            warn!("Link delegation was missing, attached router listener");
        }
        attached
    }

    /// The handle this router registers on its page
    pub fn listener_handle(self: &Arc<Self>) -> Weak<dyn PageListener> {
        Arc::downgrade(self) as Weak<dyn PageListener>
    }

    fn attach(self: &Arc<Self>) -> bool {
        self.page.attach_listener(self.listener_handle())
    }

    /// Navigate to an in-app path without reloading the page
    pub fn navigate(&self, path: &str) -> NavigateOutcome {
        if !path.starts_with('/') {
            warn!(path = %path, "Refusing to navigate to a non-absolute path");
            return NavigateOutcome::Rejected;
        }

        {
            let mut current = self.current_path.write();
            if current.as_deref().is_some_and(|current| same_location(current, path)) {
                debug!(path = %path, "Already at path, skipping navigation");
                return NavigateOutcome::Unchanged;
            }
            *current = Some(path.to_string());
        }

        self.page.push_state(path);
        self.dispatch(path)
    }

    /// Browser back; dispatches the revealed entry without pushing history
    pub fn back(&self) -> Option<NavigateOutcome> {
        let revealed = self.page.history_back()?;
        Some(self.restore(&revealed))
    }

    /// Browser forward; dispatches the revealed entry without pushing history
    pub fn forward(&self) -> Option<NavigateOutcome> {
        let revealed = self.page.history_forward()?;
        Some(self.restore(&revealed))
    }

    fn restore(&self, path: &str) -> NavigateOutcome {
        {
            let mut current = self.current_path.write();
            if current.as_deref().is_some_and(|current| same_location(current, path)) {
                return NavigateOutcome::Unchanged;
            }
            *current = Some(path.to_string());
        }
        self.dispatch(path)
    }

    fn find(&self, path: &str) -> Option<(Route, RouteContext)> {
        let normalized = normalize_path(path);
        let routes = self.routes.read();
        routes.iter().find_map(|route| {
            route.pattern.matches(normalized).map(|params| {
                (
                    route.clone(),
                    RouteContext {
                        path: path.to_string(),
                        params,
                    },
                )
            })
        })
    }

    // Handlers run with no router lock held so they may navigate again.
    fn dispatch(&self, path: &str) -> NavigateOutcome {
        match self.find(path) {
            Some((route, context)) => {
                debug!(path = %path, pattern = %route.pattern, "Dispatching route");
                (route.handler)(&context);
                NavigateOutcome::Dispatched {
                    pattern: route.pattern.as_str().to_string(),
                }
            }
            None => {
                warn!(path = %path, "No route matches path");
                NavigateOutcome::NoRoute
            }
        }
    }
}

impl PageListener for Router {
    fn on_click(&self, link: &NavigationLink) -> bool {
        if !link.internal {
            return false;
        }
        let outcome = self.navigate(&link.href);
        debug!(href = %link.href, outcome = ?outcome, "Intercepted link click");
        outcome != NavigateOutcome::Rejected
    }

    fn on_pop_state(&self, path: &str) {
        self.restore(path);
    }
}
