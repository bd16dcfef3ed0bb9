//! Replays captured HTML pages through the [`Driver`] interface.
//!
//! Pages are registered by URL. Navigating to an unregistered URL loads an
//! empty "Page not found" document, the way the live site answers. Clicking
//! an element with an `href` navigates to it. Every navigation bumps a
//! generation counter and handles from older generations are stale.

use anyhow::{anyhow, bail, Result};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use super::{Driver, Scope};

const NOT_FOUND: &str =
    "<html><head><title>Page not found</title></head><body><h1>404</h1></body></html>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotNode {
    generation: u64,
    index: usize,
}

struct Loaded {
    url: String,
    document: Html,
    generation: u64,
}

pub struct SnapshotDriver {
    pages: HashMap<String, String>,
    current: RefCell<Loaded>,
    navigations: RefCell<Vec<String>>,
}

impl Default for SnapshotDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotDriver {
    pub fn new() -> Self {
        Self {
            pages: HashMap::new(),
            current: RefCell::new(Loaded {
                url: "about:blank".to_string(),
                document: Html::parse_document("<html><head></head><body></body></html>"),
                generation: 0,
            }),
            navigations: RefCell::new(Vec::new()),
        }
    }

    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(normalize(url), html.into());
        self
    }

    /// Every URL navigated to so far, in order (clicks included).
    pub fn navigations(&self) -> Vec<String> {
        self.navigations.borrow().clone()
    }

    fn with_element<T>(
        &self,
        node: &SnapshotNode,
        f: impl FnOnce(ElementRef<'_>, &Loaded) -> T,
    ) -> Result<T> {
        let loaded = self.current.borrow();
        if node.generation != loaded.generation {
            bail!("stale element reference: element is not attached to the page document");
        }
        let element = loaded
            .document
            .tree
            .nodes()
            .nth(node.index)
            .and_then(ElementRef::wrap)
            .ok_or_else(|| anyhow!("no such element"))?;
        let out = f(element, &loaded);
        Ok(out)
    }

    fn handle(loaded: &Loaded, element: ElementRef<'_>) -> Option<SnapshotNode> {
        let id = element.id();
        loaded
            .document
            .tree
            .nodes()
            .position(|n| n.id() == id)
            .map(|index| SnapshotNode {
                generation: loaded.generation,
                index,
            })
    }
}

impl Driver for SnapshotDriver {
    type Node = SnapshotNode;

    fn navigate(&self, url: &str) -> Result<()> {
        let html = self
            .pages
            .get(&normalize(url))
            .map(String::as_str)
            .unwrap_or(NOT_FOUND);
        let mut loaded = self.current.borrow_mut();
        loaded.document = Html::parse_document(html);
        loaded.url = url.to_string();
        loaded.generation += 1;
        self.navigations.borrow_mut().push(url.to_string());
        Ok(())
    }

    fn current_url(&self) -> Result<String> {
        Ok(self.current.borrow().url.clone())
    }

    fn title(&self) -> Result<String> {
        let loaded = self.current.borrow();
        let selector = parse("title")?;
        let title = loaded
            .document
            .select(&selector)
            .next()
            .map(|t| collapse_whitespace(&t.text().collect::<String>()))
            .unwrap_or_default();
        Ok(title)
    }

    fn page_source(&self) -> Result<String> {
        Ok(self.current.borrow().document.html())
    }

    fn find_all(&self, scope: Scope<'_, SnapshotNode>, selector: &str) -> Result<Vec<SnapshotNode>> {
        let selector = parse(selector)?;
        match scope {
            Scope::Page => {
                let loaded = self.current.borrow();
                let nodes = loaded
                    .document
                    .select(&selector)
                    .filter_map(|el| Self::handle(&loaded, el))
                    .collect();
                Ok(nodes)
            }
            Scope::Within(node) => self.with_element(node, |element, loaded| {
                element
                    .select(&selector)
                    .filter_map(|el| Self::handle(loaded, el))
                    .collect()
            }),
        }
    }

    fn text(&self, node: &SnapshotNode) -> Result<String> {
        self.with_element(node, |element, _| {
            collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
        })
    }

    fn attribute(&self, node: &SnapshotNode, name: &str) -> Result<Option<String>> {
        self.with_element(node, |element, loaded| {
            let raw = element.value().attr(name)?;
            if !raw.is_empty() && matches!(name, "href" | "src") {
                if let Ok(base) = Url::parse(&loaded.url) {
                    if let Ok(joined) = base.join(raw) {
                        return Some(joined.to_string());
                    }
                }
            }
            Some(raw.to_string())
        })
    }

    fn tag_name(&self, node: &SnapshotNode) -> Result<String> {
        self.with_element(node, |element, _| element.value().name().to_lowercase())
    }

    fn execute_script(&self, _script: &str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn scroll_into_view(&self, node: &SnapshotNode) -> Result<()> {
        self.with_element(node, |_, _| ())
    }

    fn click(&self, node: &SnapshotNode) -> Result<()> {
        let target = self.attribute(node, "href")?;
        if let Some(href) = target {
            self.navigate(&href)?;
        }
        Ok(())
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        if self.find_all(Scope::Page, selector)?.is_empty() {
            bail!("timed out after {timeout:?} waiting for `{selector}`");
        }
        Ok(())
    }
}

fn parse(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("invalid selector `{selector}`: {e:?}"))
}

fn normalize(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
