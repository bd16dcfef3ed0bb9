//! Ordered selector-fallback resolution.
//!
//! Every field on every page goes through [`locate`]: candidates are tried
//! in order, the first one that yields something wins, and a candidate that
//! errors (bad selector, stale node) is treated like one that matched
//! nothing. If no candidate yields, the caller's default comes back.

use tracing::trace;

use crate::driver::{Driver, Scope};

/// What to read from the matched node(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode<'a> {
    /// Trimmed text of the first matching node.
    Text,
    /// Named attribute of the first matching node.
    Attribute(&'a str),
    /// Trimmed, non-empty texts of every node matched by the first
    /// candidate that matches at least one node.
    Texts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    One(String),
    Many(Vec<String>),
}

impl Located {
    pub fn into_string(self) -> String {
        match self {
            Located::One(s) => s,
            Located::Many(v) => v.join(", "),
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        match self {
            Located::One(s) if s.is_empty() => Vec::new(),
            Located::One(s) => vec![s],
            Located::Many(v) => v,
        }
    }
}

pub fn locate<D: Driver>(
    driver: &D,
    scope: Scope<'_, D::Node>,
    candidates: &[&str],
    mode: Mode<'_>,
    default: Located,
) -> Located {
    for selector in candidates {
        match try_candidate(driver, scope, selector, mode) {
            Ok(Some(found)) => return found,
            Ok(None) => trace!(selector, "selector matched nothing usable"),
            Err(e) => trace!(selector, error = %e, "selector failed"),
        }
    }
    default
}

fn try_candidate<D: Driver>(
    driver: &D,
    scope: Scope<'_, D::Node>,
    selector: &str,
    mode: Mode<'_>,
) -> anyhow::Result<Option<Located>> {
    match mode {
        Mode::Text => {
            let node = driver.find_first(scope, selector)?;
            let text = driver.text(&node)?.trim().to_string();
            Ok((!text.is_empty()).then_some(Located::One(text)))
        }
        Mode::Attribute(name) => {
            let node = driver.find_first(scope, selector)?;
            let value = driver.attribute(&node, name)?.unwrap_or_default();
            Ok((!value.is_empty()).then_some(Located::One(value)))
        }
        Mode::Texts => {
            let nodes = driver.find_all(scope, selector)?;
            let mut texts = Vec::with_capacity(nodes.len());
            for node in &nodes {
                let text = driver.text(node)?.trim().to_string();
                if !text.is_empty() {
                    texts.push(text);
                }
            }
            Ok((!texts.is_empty()).then_some(Located::Many(texts)))
        }
    }
}

/// First non-empty text among `candidates`, else `default`.
pub fn first_text<D: Driver>(
    driver: &D,
    scope: Scope<'_, D::Node>,
    candidates: &[&str],
    default: &str,
) -> String {
    locate(driver, scope, candidates, Mode::Text, Located::One(default.to_string())).into_string()
}

/// First non-empty `attribute` among `candidates`, else `default`.
pub fn first_attribute<D: Driver>(
    driver: &D,
    scope: Scope<'_, D::Node>,
    candidates: &[&str],
    attribute: &str,
    default: &str,
) -> String {
    locate(
        driver,
        scope,
        candidates,
        Mode::Attribute(attribute),
        Located::One(default.to_string()),
    )
    .into_string()
}

/// Texts from the first candidate that yields any, else empty.
pub fn all_texts<D: Driver>(
    driver: &D,
    scope: Scope<'_, D::Node>,
    candidates: &[&str],
) -> Vec<String> {
    locate(driver, scope, candidates, Mode::Texts, Located::Many(Vec::new())).into_vec()
}

/// Nodes from the first candidate that matches at least one.
pub fn first_present<D: Driver>(
    driver: &D,
    scope: Scope<'_, D::Node>,
    candidates: &[&str],
) -> Vec<D::Node> {
    for selector in candidates {
        match driver.find_all(scope, selector) {
            Ok(nodes) if !nodes.is_empty() => return nodes,
            Ok(_) => trace!(selector, "selector matched nothing"),
            Err(e) => trace!(selector, error = %e, "selector failed"),
        }
    }
    Vec::new()
}
