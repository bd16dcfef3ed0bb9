use anyhow::Result;
use headless_chrome::protocol::cdp::DOM;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::{Driver, Scope};

/// DOM node id inside the live tab. Invalidated by navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeNode(DOM::NodeId);

/// Launch parameters for the browser session.
#[derive(Debug, Clone)]
pub struct ChromeOptions {
    pub headless: bool,
    pub element_timeout: Duration,
}

/// One Chrome process with a single tab.
///
/// The process is shut down when this value is dropped, so holding it for
/// the length of a run scopes the browser to that run.
pub struct ChromeDriver {
    // Kept alive for the tab; dropping it kills Chrome.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeDriver {
    pub fn launch(options: &ChromeOptions) -> Result<Self> {
        let args = vec![
            std::ffi::OsStr::new("--no-sandbox"),
            std::ffi::OsStr::new("--disable-dev-shm-usage"),
            std::ffi::OsStr::new("--window-size=1920,1080"),
        ];

        let browser = Browser::new(LaunchOptions {
            headless: options.headless,
            window_size: Some((1920, 1080)),
            args,
            ..Default::default()
        })?;

        let tab = browser.new_tab()?;
        tab.set_default_timeout(options.element_timeout);
        info!(headless = options.headless, "Chrome session started");

        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    /// Drops the browser explicitly so shutdown is logged at a known point.
    pub fn close(self) {
        drop(self);
        info!("Chrome session closed");
    }

    fn element(&self, node: &ChromeNode) -> Result<Element<'_>> {
        Element::new(&self.tab, node.0)
    }

    fn root(&self) -> Result<DOM::NodeId> {
        Ok(self.tab.get_document()?.node_id)
    }
}

impl Driver for ChromeDriver {
    type Node = ChromeNode;

    fn navigate(&self, url: &str) -> Result<()> {
        self.tab.navigate_to(url)?;
        self.tab.wait_until_navigated()?;
        Ok(())
    }

    fn current_url(&self) -> Result<String> {
        Ok(self.tab.get_url())
    }

    fn title(&self) -> Result<String> {
        self.tab.get_title()
    }

    fn page_source(&self) -> Result<String> {
        self.tab.get_content()
    }

    fn find_all(&self, scope: Scope<'_, ChromeNode>, selector: &str) -> Result<Vec<ChromeNode>> {
        let node_id = match scope {
            Scope::Page => self.root()?,
            Scope::Within(node) => node.0,
        };
        let found = self.tab.call_method(DOM::QuerySelectorAll {
            node_id,
            selector: selector.to_string(),
        })?;
        Ok(found.node_ids.into_iter().map(ChromeNode).collect())
    }

    fn text(&self, node: &ChromeNode) -> Result<String> {
        self.element(node)?.get_inner_text()
    }

    fn attribute(&self, node: &ChromeNode, name: &str) -> Result<Option<String>> {
        // An empty attribute stays empty; a set one is read through the DOM
        // property so `href`/`src` come back absolute.
        let remote = self.element(node)?.call_js_fn(
            "function(name) { const raw = this.getAttribute(name); if (!raw) { return raw; } const v = this[name]; return (typeof v === 'string' && v) ? v : raw; }",
            vec![json!(name)],
            false,
        )?;
        Ok(remote.value.and_then(|v| v.as_str().map(str::to_string)))
    }

    fn tag_name(&self, node: &ChromeNode) -> Result<String> {
        Ok(self.element(node)?.tag_name.to_lowercase())
    }

    fn execute_script(&self, script: &str) -> Result<Value> {
        Ok(self.tab.evaluate(script, false)?.value.unwrap_or(Value::Null))
    }

    fn scroll_into_view(&self, node: &ChromeNode) -> Result<()> {
        self.element(node)?.call_js_fn(
            "function() { this.scrollIntoView({block: 'center'}); }",
            vec![],
            false,
        )?;
        Ok(())
    }

    fn click(&self, node: &ChromeNode) -> Result<()> {
        self.element(node)?
            .call_js_fn("function() { this.click(); }", vec![], false)?;
        Ok(())
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.tab
            .wait_for_element_with_custom_timeout(selector, timeout)
            .map(|_| ())
    }
}
