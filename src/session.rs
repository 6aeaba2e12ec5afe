//! Browse session state
//!
//! Selection, language and filter state of one visitor. Content lookups are
//! tagged with a `RequestToken`; only the completion carrying the newest token
//! is applied, so a slow response for an earlier selection cannot replace the
//! content of a later one.

use crate::catalog::{Catalog, Cultivar};
use crate::content::{CultivarContent, Language};
use crate::filter::{filter_catalog, FilterState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Monotonic token issuer shared with in-flight fetch tasks
#[derive(Debug, Default)]
pub struct RequestGate {
    latest: AtomicU64,
}

impl RequestGate {
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

/// What the content panel currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum ContentView {
    /// No selection yet, or a lookup is in flight
    Pending,
    Loaded(Arc<CultivarContent>),
    /// Neither localized nor default content exists
    Fallback,
}

#[derive(Debug)]
pub struct BrowseSession {
    gate: Arc<RequestGate>,
    selected: Option<String>,
    language: Language,
    filters: FilterState,
    view: ContentView,
}

impl Default for BrowseSession {
    fn default() -> Self {
        Self::new(Language::default())
    }
}

impl BrowseSession {
    pub fn new(language: Language) -> Self {
        Self {
            gate: Arc::new(RequestGate::default()),
            selected: None,
            language,
            filters: FilterState::default(),
            view: ContentView::Pending,
        }
    }

    /// Gate handle for tasks that want to bail out early once superseded
    pub fn gate(&self) -> Arc<RequestGate> {
        self.gate.clone()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn view(&self) -> &ContentView {
        &self.view
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn filters_mut(&mut self) -> &mut FilterState {
        &mut self.filters
    }

    /// Select a cultivar; the returned token must accompany the content
    /// completion for this selection.
    pub fn begin_selection(&mut self, cultivar_id: &str) -> RequestToken {
        self.selected = Some(cultivar_id.to_string());
        self.view = ContentView::Pending;
        self.gate.issue()
    }

    /// Switch language; re-requests content for the current selection.
    pub fn set_language(&mut self, language: Language) -> Option<RequestToken> {
        self.language = language;
        let selected = self.selected.clone()?;
        Some(self.begin_selection(&selected))
    }

    /// Apply a finished lookup. Returns false, leaving state untouched, when
    /// a newer selection has been made since `token` was issued.
    pub fn complete(&mut self, token: RequestToken, content: Option<Arc<CultivarContent>>) -> bool {
        if !self.gate.is_current(token) {
            tracing::debug!("Dropping stale content response {:?}", token);
            return false;
        }
        self.view = match content {
            Some(content) => ContentView::Loaded(content),
            None => ContentView::Fallback,
        };
        true
    }

    /// Cultivars visible under the current filters
    pub fn visible<'a>(&self, catalog: &'a Catalog) -> Vec<&'a Cultivar> {
        filter_catalog(catalog, &self.filters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::sample_catalog;
    use crate::content::{Description, Images, PerformanceMetrics, Recommendations};

    fn content(title: &str) -> Arc<CultivarContent> {
        let text = |s: &str| s.to_string();
        Arc::new(CultivarContent {
            description: Description {
                title: text(title),
                paragraphs: vec![],
            },
            images: Images {
                banner: text("/b.jpg"),
                carousel: vec![],
            },
            performance_metrics: PerformanceMetrics {
                yield_text: text("High"),
                firmness: text("Firm"),
                size: text("Large"),
                appearance: text("Glossy"),
            },
            recommendations: Recommendations {
                planting: text("Oct"),
                spacing: text("30 cm"),
                fertility: text("Moderate"),
                harvest: text("Weekly"),
            },
        })
    }

    #[test]
    fn test_stale_response_dropped() {
        let mut session = BrowseSession::default();
        let first = session.begin_selection("x");
        let second = session.begin_selection("y");

        // "x" resolves after "y" was selected
        assert!(!session.complete(first, Some(content("X"))));
        assert_eq!(session.view(), &ContentView::Pending);

        assert!(session.complete(second, Some(content("Y"))));
        match session.view() {
            ContentView::Loaded(c) => assert_eq!(c.description.title, "Y"),
            other => panic!("unexpected view {:?}", other),
        }
        assert!(!session.complete(first, Some(content("X"))));
        assert_eq!(session.selected(), Some("y"));
    }

    #[test]
    fn test_missing_content_shows_fallback() {
        let mut session = BrowseSession::default();
        let token = session.begin_selection("x");
        assert!(session.complete(token, None));
        assert_eq!(session.view(), &ContentView::Fallback);
    }

    #[test]
    fn test_language_switch_reissues_token() {
        let mut session = BrowseSession::default();
        assert!(session.set_language(Language::parse("es").unwrap()).is_none());

        let old = session.begin_selection("x");
        let new = session.set_language(Language::parse("fr").unwrap()).unwrap();
        assert!(new > old);
        assert!(!session.gate().is_current(old));
        assert_eq!(session.language().as_str(), "fr");
    }

    #[test]
    fn test_visible_follows_filters() {
        let catalog = sample_catalog();
        let mut session = BrowseSession::default();
        session.filters_mut().toggle_attribute(&catalog, "cold tolerant").unwrap();
        let ids: Vec<&str> = session.visible(&catalog).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["debug", "y"]);
        session.filters_mut().clear_all();
        assert_eq!(session.visible(&catalog).len(), catalog.len());
    }
}
