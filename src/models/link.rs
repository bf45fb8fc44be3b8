/// Attribute marking an anchor as an in-app link handled by the router
pub const INTERNAL_LINK_MARKER: &str = "data-link";

/// An anchor element discovered on the page
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationLink {
    /// Target path (`href` attribute)
    pub href: String,
    /// Visible text
    pub label: String,
    /// Whether the anchor carries the internal-link marker
    pub internal: bool,
}

impl NavigationLink {
    pub fn internal(href: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            label: label.into(),
            internal: true,
        }
    }

    pub fn external(href: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            label: label.into(),
            internal: false,
        }
    }
}
