#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Result};
use serde_json::Value;

use roocash_crawler::driver::{Driver, Scope, SnapshotDriver};
use roocash_crawler::Settings;

pub const TIMESTAMP: &str = "20240101_000000";

/// Wraps a [`SnapshotDriver`] and injects the failures a live page shows:
/// one selector that always comes back stale, and items whose handle dies
/// before they are read.
pub struct FlakyDriver {
    pub inner: SnapshotDriver,
    /// Queries for exactly this selector fail.
    pub stale_selector: Option<&'static str>,
    /// Items whose text contains this marker report a dead handle.
    pub poison: Option<&'static str>,
    /// Links whose href contains this marker cannot have their text read.
    pub unreadable: Option<&'static str>,
}

impl FlakyDriver {
    pub fn new(inner: SnapshotDriver) -> Self {
        Self {
            inner,
            stale_selector: None,
            poison: None,
            unreadable: None,
        }
    }

    pub fn stale(mut self, selector: &'static str) -> Self {
        self.stale_selector = Some(selector);
        self
    }

    pub fn poison(mut self, marker: &'static str) -> Self {
        self.poison = Some(marker);
        self
    }

    pub fn unreadable(mut self, marker: &'static str) -> Self {
        self.unreadable = Some(marker);
        self
    }
}

type SnapNode = <SnapshotDriver as Driver>::Node;

impl Driver for FlakyDriver {
    type Node = SnapNode;

    fn navigate(&self, url: &str) -> Result<()> {
        self.inner.navigate(url)
    }

    fn current_url(&self) -> Result<String> {
        self.inner.current_url()
    }

    fn title(&self) -> Result<String> {
        self.inner.title()
    }

    fn page_source(&self) -> Result<String> {
        self.inner.page_source()
    }

    fn find_all(&self, scope: Scope<'_, SnapNode>, selector: &str) -> Result<Vec<SnapNode>> {
        if self.stale_selector == Some(selector) {
            bail!("stale element reference: {selector}");
        }
        self.inner.find_all(scope, selector)
    }

    fn text(&self, node: &SnapNode) -> Result<String> {
        if let Some(marker) = self.unreadable {
            let href = self.inner.attribute(node, "href")?.unwrap_or_default();
            if href.contains(marker) {
                bail!("stale element reference: {href}");
            }
        }
        self.inner.text(node)
    }

    fn attribute(&self, node: &SnapNode, name: &str) -> Result<Option<String>> {
        self.inner.attribute(node, name)
    }

    fn tag_name(&self, node: &SnapNode) -> Result<String> {
        if let Some(marker) = self.poison {
            if self.inner.text(node)?.contains(marker) {
                bail!("stale element reference: element is not attached to the page document");
            }
        }
        self.inner.tag_name(node)
    }

    fn execute_script(&self, script: &str) -> Result<Value> {
        self.inner.execute_script(script)
    }

    fn scroll_into_view(&self, node: &SnapNode) -> Result<()> {
        self.inner.scroll_into_view(node)
    }

    fn click(&self, node: &SnapNode) -> Result<()> {
        self.inner.click(node)
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.inner.wait_for(selector, timeout)
    }
}

pub fn settings(output: &Path) -> Settings {
    Settings {
        output_dir: output.to_path_buf(),
        ..Settings::default()
    }
}

/// Rows of a BOM-prefixed CSV artifact, header first.
pub fn read_csv(path: &Path) -> Vec<Vec<String>> {
    let bytes = std::fs::read(path).unwrap();
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(&bytes[..]);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(body);
    reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

pub fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}
