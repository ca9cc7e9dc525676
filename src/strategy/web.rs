//! Bookmarks, history and web search
//!
//! Every non-empty input yields a search-engine entry, preceded by a
//! direct "go to" entry when the input looks like a URL. Bookmarks and
//! history follow, fuzzy-matched on title and url. The link collection is
//! fetched from the backend on first use and kept afterwards.

use super::{ComponentKey, DisplayProps, SelectOutcome, SuggesterStrategy};
use crate::fuzzy::{FuzzySearch, KEY_TITLE, KEY_URL, SearchKey, SearchOptions, SearchResult};
use crate::model::{LinkRecord, LinkType};
use crate::suggest::error::Result;
use crate::suggest::keymap::{KeyChord, ScopeAction, SelectMode, new_tab_bindings};
use async_trait::async_trait;
use regex::Regex;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::LazyLock;
use url::Url;

static URL_SCHEME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?:|file:/)//").expect("URL scheme pattern is valid")
});

static NOSCHEME_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^#?/.]+(?:\.[^#?/.]+)+(?:/\S*)?").expect("bare URL pattern is valid")
});

/// Browser side of the host
#[async_trait(?Send)]
pub trait WebBackend {
    /// Search-engine URL for `query`
    fn search_engine_url(&self, query: &str) -> String;

    async fn bookmarks(&self) -> Vec<LinkRecord>;

    async fn history(&self) -> Vec<LinkRecord>;

    /// Show `url` in the web view
    async fn navigate(&self, url: &str, new_tab: bool) -> crate::host::Result<()>;
}

/// URL to open for URL-like input, `None` for anything else
///
/// Input with whitespace never counts. Input without a scheme must look
/// like a dotted host name and gets `https://` prepended. The result is
/// percent-encoded.
#[must_use]
pub fn resolve_url(input: &str) -> Option<String> {
    if input.is_empty() || input.chars().any(char::is_whitespace) {
        return None;
    }

    let with_scheme = if URL_SCHEME_RE.is_match(input) {
        input.to_string()
    } else if NOSCHEME_URL_RE.is_match(input) {
        format!("https://{input}")
    } else {
        return None;
    };
    Some(
        Url::parse(&with_scheme)
            .map(String::from)
            .unwrap_or(with_scheme),
    )
}

pub struct WebStrategy {
    backend: Rc<dyn WebBackend>,
    max_results: usize,
    links: RefCell<Option<Rc<FuzzySearch<LinkRecord>>>>,
}

impl WebStrategy {
    #[must_use]
    pub fn new(backend: Rc<dyn WebBackend>, max_results: usize) -> Self {
        Self {
            backend,
            max_results,
            links: RefCell::new(None),
        }
    }

    /// Bookmarks then history, loaded once
    async fn links(&self) -> Rc<FuzzySearch<LinkRecord>> {
        if let Some(links) = self.links.borrow().as_ref() {
            return Rc::clone(links);
        }

        let mut records = self.backend.bookmarks().await;
        records.extend(self.backend.history().await);
        tracing::debug!("Loaded {} web links", records.len());

        let options = SearchOptions::default()
            .with_keys(vec![SearchKey::new(KEY_TITLE, 1.0), SearchKey::new(KEY_URL, 1.0)]);
        let links = Rc::new(FuzzySearch::new(records, options));
        self.links.replace(Some(Rc::clone(&links)));
        links
    }
}

#[async_trait(?Send)]
impl SuggesterStrategy for WebStrategy {
    type Item = SearchResult<LinkRecord>;

    async fn get_suggestions(&self, input: &str) -> Vec<Self::Item> {
        if input.is_empty() {
            return Vec::new();
        }
        let links = self.links().await;

        let mut results = Vec::new();
        if let Some(url) = resolve_url(input) {
            results.push(SearchResult::synthetic(LinkRecord::new(
                input,
                url,
                LinkType::Goto,
            )));
        }
        results.push(SearchResult::synthetic(LinkRecord::new(
            input,
            self.backend.search_engine_url(input),
            LinkType::Search,
        )));
        results.extend(links.raw_search(input, Some(self.max_results)));
        results
    }

    async fn use_selected_item(
        &self,
        result: Self::Item,
        mode: SelectMode,
        _input: &str,
    ) -> Result<SelectOutcome> {
        let LinkRecord { title, url, .. } = result.item;
        let url = if url.is_empty() && !title.is_empty() {
            self.backend.search_engine_url(&title)
        } else {
            url
        };
        if !url.is_empty() {
            self.backend.navigate(&url, mode.new_tab()).await?;
        }
        Ok(SelectOutcome::Close)
    }

    fn display_props(&self, result: &Self::Item, _input: &str) -> DisplayProps {
        let link = &result.item;
        let label = if link.title.is_empty() {
            link.url.clone()
        } else {
            link.title.clone()
        };
        let label_matches = result
            .matched_key(KEY_TITLE)
            .filter(|m| m.value == label)
            .map(|m| m.indices.clone())
            .unwrap_or_default();

        DisplayProps {
            label,
            label_matches,
            detail: Some(link.url.clone()),
            badge: Some(link.link_type.to_string()),
            ..DisplayProps::default()
        }
    }

    fn component_key(&self) -> ComponentKey {
        ComponentKey::WebSuggestion
    }

    fn key_bindings(&self) -> Vec<(KeyChord, ScopeAction)> {
        new_tab_bindings()
    }
}
