// In-app route table

use crate::core::error::NavigationError;
use crate::page::document::Page;
use crate::router::route::RouteContext;
use crate::router::router::Router;
use std::sync::Arc;
use tracing::info;

/// Pages of the organizer, in match priority order
const VIEWS: &[(&str, &str)] = &[
    ("/", "landing"),
    ("/app", "workspace"),
    ("/app/books/:id", "book"),
    ("/auth", "auth"),
    ("/auth/reset-password", "reset-password"),
    ("/profile", "profile"),
    ("/payment/success", "payment-success"),
    ("/payment/cancelled", "payment-cancelled"),
    ("/contact", "contact"),
    ("/privacy", "privacy"),
    ("/terms", "terms"),
];

pub fn register_routes(router: &Router) -> Result<(), NavigationError> {
    for &(pattern, view) in VIEWS {
        let page = Arc::clone(router.page());
        router.route(pattern, move |ctx| show_view(&page, view, ctx))?;
    }
    Ok(())
}

fn show_view(page: &Page, view: &str, ctx: &RouteContext) {
    let view = match ctx.param("id") {
        Some(id) => format!("{view}:{id}"),
        None => view.to_string(),
    };
    info!(path = %ctx.path, view = %view, "View rendered");
    page.set_active_view(view);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::router::NavigateOutcome;

    fn app_router() -> Arc<Router> {
        let router = Arc::new(Router::new(Arc::new(Page::new("/", Vec::new()))));
        register_routes(&router).unwrap();
        router
    }

    #[test]
    fn test_all_views_registered() {
        assert_eq!(app_router().route_count(), VIEWS.len());
    }

    #[test]
    fn test_navigation_sets_active_view() {
        let router = app_router();

        router.navigate("/profile");
        assert_eq!(router.page().active_view().as_deref(), Some("profile"));

        router.navigate("/app/books/17");
        assert_eq!(router.page().active_view().as_deref(), Some("book:17"));
    }

    #[test]
    fn test_unknown_path_keeps_previous_view() {
        let router = app_router();

        router.navigate("/contact");
        assert_eq!(router.navigate("/admin"), NavigateOutcome::NoRoute);
        assert_eq!(router.page().active_view().as_deref(), Some("contact"));
    }
}
