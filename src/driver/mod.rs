//! Browser capability consumed by the crawler.
//!
//! Everything above this module talks to a [`Driver`]; the concrete
//! implementations are a real Chrome session ([`chrome::ChromeDriver`]) and
//! an in-memory HTML replay ([`snapshot::SnapshotDriver`]).

pub mod chrome;
pub mod snapshot;

use anyhow::Result;
use std::fmt;
use std::time::Duration;

pub use chrome::ChromeDriver;
pub use snapshot::SnapshotDriver;

/// Where a selector query is evaluated.
pub enum Scope<'a, N> {
    /// The whole current document.
    Page,
    /// Descendants of one element.
    Within(&'a N),
}

impl<N> Clone for Scope<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for Scope<'_, N> {}

impl<N> fmt::Debug for Scope<'_, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Page => f.write_str("Page"),
            Scope::Within(_) => f.write_str("Within(..)"),
        }
    }
}

/// The browser operations the crawler relies on.
///
/// Node handles are only valid for the page load that produced them; any
/// call with a handle from an earlier load must fail rather than answer.
pub trait Driver {
    type Node: Clone + fmt::Debug;

    fn navigate(&self, url: &str) -> Result<()>;

    fn current_url(&self) -> Result<String>;

    fn title(&self) -> Result<String>;

    /// Serialized DOM of the current page.
    fn page_source(&self) -> Result<String>;

    /// All elements matching `selector` in document order. No match is an
    /// empty vector, not an error.
    fn find_all(&self, scope: Scope<'_, Self::Node>, selector: &str) -> Result<Vec<Self::Node>>;

    fn find_first(&self, scope: Scope<'_, Self::Node>, selector: &str) -> Result<Self::Node> {
        self.find_all(scope, selector)?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("no element matches `{selector}`"))
    }

    /// Rendered text of the element.
    fn text(&self, node: &Self::Node) -> Result<String>;

    /// Attribute (or same-named DOM property) of the element.
    fn attribute(&self, node: &Self::Node, name: &str) -> Result<Option<String>>;

    /// Lowercase tag name.
    fn tag_name(&self, node: &Self::Node) -> Result<String>;

    /// Evaluates a JavaScript expression in the page.
    fn execute_script(&self, script: &str) -> Result<serde_json::Value>;

    fn scroll_into_view(&self, node: &Self::Node) -> Result<()>;

    /// Programmatic activation (`element.click()` in page JS).
    fn click(&self, node: &Self::Node) -> Result<()>;

    /// Blocks until `selector` matches something or `timeout` elapses.
    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;
}
