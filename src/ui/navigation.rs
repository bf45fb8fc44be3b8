use crate::models::user::User;
use crate::ui::readiness::ReadySignal;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Navigation chrome that reflects the signed-in user
pub trait AppUi: Send + Sync {
    /// Redraw the user navigation; safe to call repeatedly with the same user
    fn create_user_navigation(&self, user: &User);
}

/// Shared handle the readiness signal carries
pub type SharedAppUi = Arc<dyn AppUi>;

/// The `#user-nav` region of the page header
#[derive(Default)]
pub struct NavigationRegion {
    markup: RwLock<String>,
    renders: AtomicU32,
}

impl NavigationRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount the region and announce it as ready
    pub fn mount(self: &Arc<Self>, signal: &ReadySignal<SharedAppUi>) {
        let shared: SharedAppUi = self.clone();
        signal.publish(shared);
        debug!("Navigation region mounted");
    }

    /// Current markup of the region; empty until first render
    pub fn markup(&self) -> String {
        self.markup.read().clone()
    }

    pub fn render_count(&self) -> u32 {
        self.renders.load(Ordering::Relaxed)
    }

    /// Name currently shown, if any
    pub fn displayed_name(&self) -> Option<String> {
        let markup = self.markup.read();
        let start = markup.find(r#"<span class="user-name">"#)? + r#"<span class="user-name">"#.len();
        let end = markup[start..].find("</span>")? + start;
        Some(unescape(&markup[start..end]))
    }
}

impl AppUi for NavigationRegion {
    fn create_user_navigation(&self, user: &User) {
        let rendered = render_user_nav(user);
        *self.markup.write() = rendered;
        self.renders.fetch_add(1, Ordering::Relaxed);
        debug!(user_id = %user.id, "User navigation rendered");
    }
}

fn render_user_nav(user: &User) -> String {
    format!(
        concat!(
            r#"<div id="user-nav">"#,
            r#"<span class="user-name">{name}</span>"#,
            r#"<span class="credits">{credits} credits</span>"#,
            r#"<a href="/profile" data-link>Profile</a>"#,
            r#"</div>"#,
        ),
        name = escape(&user.display_name),
        credits = user.credits,
    )
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::readiness::readiness;

    #[test]
    fn test_render_shows_name_and_credits() {
        let region = NavigationRegion::new();
        region.create_user_navigation(&User::new("u-1", "Alice", 120));

        assert!(region.markup().contains("120 credits"));
        assert_eq!(region.displayed_name().as_deref(), Some("Alice"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let region = NavigationRegion::new();
        let user = User::new("u-1", "Alice", 5);

        region.create_user_navigation(&user);
        let first = region.markup();
        region.create_user_navigation(&user);

        assert_eq!(region.markup(), first);
        assert_eq!(region.render_count(), 2);
    }

    #[test]
    fn test_display_name_is_escaped() {
        let region = NavigationRegion::new();
        region.create_user_navigation(&User::new("u-1", "<b>Bob & Co</b>", 0));

        assert!(!region.markup().contains("<b>"));
        assert_eq!(region.displayed_name().as_deref(), Some("<b>Bob & Co</b>"));
    }

    #[test]
    fn test_empty_before_render() {
        let region = NavigationRegion::new();
        assert!(region.markup().is_empty());
        assert!(region.displayed_name().is_none());
    }

    #[test]
    fn test_mount_publishes_region() {
        let (signal, watch) = readiness::<SharedAppUi>();
        let region = Arc::new(NavigationRegion::new());
        region.mount(&signal);

        let published = watch.try_get().expect("region should be published");
        published.create_user_navigation(&User::new("u-9", "Carol", 1));

        assert_eq!(region.displayed_name().as_deref(), Some("Carol"));
    }
}
