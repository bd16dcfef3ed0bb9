//! Per-template field extraction.
//!
//! Extractors only read: they never navigate or scroll, so they cannot
//! disturb the page the crawler is iterating. A field that cannot be read
//! falls back to its default; only a dead item handle fails the record.

pub mod account;
pub mod article;
pub mod credit_card;
pub mod loan;

use serde::Serialize;

use crate::driver::{Driver, Scope};
use crate::flatten::Flatten;
use crate::locator::{first_present, first_text};
use crate::records::{Banner, LabelMap};
use crate::selectors::ListingSelectors;

pub use account::AccountExtractor;
pub use credit_card::CreditCardExtractor;
pub use loan::LoanExtractor;

/// One product listing template: where its cards are and how to read one.
pub trait ProductExtractor {
    type Record: Flatten + Serialize + Clone;

    /// Human label used in logs and summaries.
    const LABEL: &'static str;

    fn listing(&self) -> &ListingSelectors;

    /// Builds the record for the `index`-th card (1-based).
    fn extract<D: Driver>(&self, driver: &D, item: &D::Node, index: usize)
        -> anyhow::Result<Self::Record>;
}

/// Fails if the handle no longer points at a live element.
pub(crate) fn ensure_attached<D: Driver>(driver: &D, item: &D::Node) -> anyhow::Result<()> {
    driver.tag_name(item).map(|_| ())
}

/// `"D 天 H 時 M 分 S 秒"` from the first four digit boxes, or `""` when
/// fewer than four are rendered.
pub fn extract_countdown<D: Driver>(driver: &D, item: &D::Node, digits_selector: &str) -> String {
    let digits = match driver.find_all(Scope::Within(item), digits_selector) {
        Ok(nodes) => nodes,
        Err(_) => return String::new(),
    };
    if digits.len() < 4 {
        return String::new();
    }
    let mut parts = Vec::with_capacity(4);
    for node in &digits[..4] {
        match driver.text(node) {
            Ok(text) => parts.push(text.trim().to_string()),
            Err(_) => return String::new(),
        }
    }
    format!(
        "{} 天 {} 時 {} 分 {} 秒",
        parts[0], parts[1], parts[2], parts[3]
    )
}

/// Label → value pairs from up to `cap` block containers.
///
/// Within each block the label and value are resolved through their own
/// candidate chains; blocks missing either half are skipped.
pub fn extract_label_blocks<D: Driver>(
    driver: &D,
    item: &D::Node,
    blocks: &[&str],
    label: &[&str],
    value: &[&str],
    cap: usize,
) -> LabelMap {
    let mut map = LabelMap::new();
    for block in first_present(driver, Scope::Within(item), blocks)
        .iter()
        .take(cap)
    {
        let l = first_text(driver, Scope::Within(block), label, "");
        let v = first_text(driver, Scope::Within(block), value, "");
        if !l.is_empty() && !v.is_empty() {
            map.insert(l, v);
        }
    }
    map
}

/// `src`/`alt` of the first banner image, empty strings if none.
pub fn extract_banner<D: Driver>(driver: &D, item: &D::Node, candidates: &[&str]) -> Banner {
    let Some(image) = first_present(driver, Scope::Within(item), candidates)
        .into_iter()
        .next()
    else {
        return Banner::default();
    };
    Banner {
        url: driver.attribute(&image, "src").ok().flatten().unwrap_or_default(),
        alt: driver.attribute(&image, "alt").ok().flatten().unwrap_or_default(),
    }
}
