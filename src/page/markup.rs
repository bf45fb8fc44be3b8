use crate::models::link::{NavigationLink, INTERNAL_LINK_MARKER};
use regex::Regex;
use std::sync::OnceLock;

/// Server-rendered shell used when no template is configured
pub const DEFAULT_SHELL: &str = r#"<header>
  <a href="/" data-link>AudioBook Organizer</a>
  <nav id="main-nav">
    <a href="/app" data-link>Workspace</a>
    <a href="/profile" data-link>Profile</a>
    <a href="/auth" data-link>Sign in</a>
    <a href="/contact" data-link>Contact</a>
  </nav>
  <div id="user-nav"></div>
</header>
<footer>
  <a href="/privacy" data-link>Privacy</a>
  <a href="/terms" data-link>Terms</a>
  <a href="https://github.com/audiobook-organizer">Source</a>
</footer>
"#;

fn anchor_regex() -> &'static Regex {
    static ANCHOR: OnceLock<Regex> = OnceLock::new();
    ANCHOR.get_or_init(|| {
        Regex::new(r#"(?is)<a\b([^>]*)>(.*?)</a>"#).expect("anchor pattern is valid")
    })
}

fn href_regex() -> &'static Regex {
    static HREF: OnceLock<Regex> = OnceLock::new();
    HREF.get_or_init(|| {
        Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("href pattern is valid")
    })
}

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        let pattern = format!(r#"(?i)(?:^|\s){}(?:\s|=|$)"#, regex::escape(INTERNAL_LINK_MARKER));
        Regex::new(&pattern).expect("marker pattern is valid")
    })
}

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"))
}

/// Find every anchor with an `href` in the markup, in document order
///
/// Anchors without an `href` are skipped. Nested tags inside the anchor are
/// stripped from the label.
pub fn discover_links(markup: &str) -> Vec<NavigationLink> {
    anchor_regex()
        .captures_iter(markup)
        .filter_map(|caps| {
            let attrs = caps.get(1)?.as_str();
            let href_caps = href_regex().captures(attrs)?;
            let href = href_caps
                .get(1)
                .or_else(|| href_caps.get(2))?
                .as_str()
                .to_string();

            let inner = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let label = tag_regex().replace_all(inner, "").trim().to_string();

            Some(NavigationLink {
                href,
                label,
                internal: marker_regex().is_match(attrs),
            })
        })
        .collect()
}
