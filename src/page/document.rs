use crate::models::link::NavigationLink;
use crate::page::history::History;
use crate::page::markup::discover_links;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info};

/// Receives the page's delegated events
///
/// Several components may listen on one page; each listener is held once.
pub trait PageListener: Send + Sync {
    /// Handle a click on a link; return true to suppress the browser default
    fn on_click(&self, link: &NavigationLink) -> bool;

    /// Handle a back/forward move to `path`
    fn on_pop_state(&self, path: &str);
}

/// What the browser did with a click
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A listener handled the click and prevented the default
    Intercepted { href: String },
    /// The browser followed the link with a full page load
    FullLoad { href: String },
}

/// Headless document: location, history, links and delegated listeners
pub struct Page {
    history: Mutex<History>,
    links: Vec<NavigationLink>,
    listeners: RwLock<Vec<Weak<dyn PageListener>>>,
    active_view: RwLock<Option<String>>,
    full_loads: AtomicU32,
}

impl Page {
    pub fn new(location: impl Into<String>, links: Vec<NavigationLink>) -> Self {
        Self {
            history: Mutex::new(History::new(location)),
            links,
            listeners: RwLock::new(Vec::new()),
            active_view: RwLock::new(None),
            full_loads: AtomicU32::new(0),
        }
    }

    /// Build a page from server-rendered markup, discovering its anchors
    pub fn from_markup(location: impl Into<String>, markup: &str) -> Self {
        let links = discover_links(markup);
        let page = Self::new(location, links);
        debug!(
            links = page.links.len(),
            internal_links = page.internal_links().count(),
            "Page links discovered"
        );
        page
    }

    pub fn location(&self) -> String {
        self.history.lock().current().to_string()
    }

    pub fn links(&self) -> &[NavigationLink] {
        &self.links
    }

    pub fn link(&self, index: usize) -> Option<&NavigationLink> {
        self.links.get(index)
    }

    /// Links carrying the internal-link marker
    pub fn internal_links(&self) -> impl Iterator<Item = &NavigationLink> {
        self.links.iter().filter(|link| link.internal)
    }

    pub fn push_state(&self, path: &str) {
        self.history.lock().push(path);
    }

    pub fn history_len(&self) -> usize {
        self.history.lock().len()
    }

    /// Attach a delegated listener
    ///
    /// Returns false and leaves the page untouched when this same listener
    /// is already attached. Dropped listeners are pruned here.
    pub fn attach_listener(&self, listener: Weak<dyn PageListener>) -> bool {
        let mut listeners = self.listeners.write();
        listeners.retain(|existing| existing.strong_count() > 0);
        if listeners.iter().any(|existing| existing.ptr_eq(&listener)) {
            return false;
        }
        listeners.push(listener);
        true
    }

    /// Detach one listener; returns whether it was attached
    pub fn detach_listener(&self, listener: &Weak<dyn PageListener>) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|existing| !existing.ptr_eq(listener));
        listeners.len() != before
    }

    /// Whether this exact listener is attached and alive
    pub fn is_listening(&self, listener: &Weak<dyn PageListener>) -> bool {
        listener.strong_count() > 0
            && self
                .listeners
                .read()
                .iter()
                .any(|existing| existing.ptr_eq(listener))
    }

    pub fn has_listener(&self) -> bool {
        !self.live_listeners().is_empty()
    }

    // Collected so no lock is held while listeners run.
    fn live_listeners(&self) -> Vec<Arc<dyn PageListener>> {
        self.listeners.read().iter().filter_map(Weak::upgrade).collect()
    }

    /// Click a link the way a user would
    ///
    /// Every listener sees the click, in attach order. Any one of them can
    /// suppress the browser default.
    pub fn click(&self, link: &NavigationLink) -> ClickOutcome {
        let mut prevented = false;
        for listener in self.live_listeners() {
            prevented |= listener.on_click(link);
        }

        if prevented {
            return ClickOutcome::Intercepted {
                href: link.href.clone(),
            };
        }

        // Default action: the browser leaves the page
        self.full_loads.fetch_add(1, Ordering::Relaxed);
        self.history.lock().push(link.href.as_str());
        info!(href = %link.href, "Full page load");

        ClickOutcome::FullLoad {
            href: link.href.clone(),
        }
    }

    /// Move the history cursor back without firing pop-state
    pub fn history_back(&self) -> Option<String> {
        self.history.lock().back().map(str::to_string)
    }

    /// Move the history cursor forward without firing pop-state
    pub fn history_forward(&self) -> Option<String> {
        self.history.lock().forward().map(str::to_string)
    }

    /// Browser back button; returns the revealed location
    pub fn back(&self) -> Option<String> {
        let revealed = self.history_back()?;
        self.pop_state(&revealed);
        Some(revealed)
    }

    /// Browser forward button; returns the revealed location
    pub fn forward(&self) -> Option<String> {
        let revealed = self.history_forward()?;
        self.pop_state(&revealed);
        Some(revealed)
    }

    fn pop_state(&self, path: &str) {
        for listener in self.live_listeners() {
            listener.on_pop_state(path);
        }
    }

    pub fn full_loads(&self) -> u32 {
        self.full_loads.load(Ordering::Relaxed)
    }

    pub fn set_active_view(&self, view: impl Into<String>) {
        *self.active_view.write() = Some(view.into());
    }

    pub fn active_view(&self) -> Option<String> {
        self.active_view.read().clone()
    }
}
