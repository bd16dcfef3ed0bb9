//! Blog listing entries and article detail pages.

use std::collections::BTreeSet;
use std::io::Cursor;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;
use url::Url;

use crate::driver::{Driver, Scope};
use crate::locator::{all_texts, first_present, first_text};
use crate::records::{ArticleLink, ArticleRecord};
use crate::selectors::{ArticleSelectors, ListingSelectors, ARTICLE};

pub const UNKNOWN_DATE: &str = "未知日期";
pub const UNCATEGORIZED: &str = "未分類";
pub const NO_IMAGE: &str = "無圖片";
pub const NO_CARD_MENTIONED: &str = "無提及信用卡";
pub const NO_CONTENT: &str = "無法獲取內容";

/// Heuristic card-name patterns. A single capture group gets "信用卡"
/// appended; multi-group matches are concatenated.
static CARD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(\w+)信用卡",
        r"(\w+)卡",
        r"(\w+)(現金|鑽石|御璽|白金|鈦金|金)卡",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("card pattern is valid"))
    .collect()
});

pub struct ArticleExtractor {
    selectors: &'static ArticleSelectors,
}

impl Default for ArticleExtractor {
    fn default() -> Self {
        Self { selectors: &ARTICLE }
    }
}

impl ArticleExtractor {
    pub fn selectors(&self) -> &'static ArticleSelectors {
        self.selectors
    }

    pub fn listing(&self) -> &ListingSelectors {
        &self.selectors.listing
    }

    /// Title and link of one listing entry, which is either the title
    /// anchor itself or a card wrapping it. `None` when either is blank.
    pub fn entry<D: Driver>(
        &self,
        driver: &D,
        element: &D::Node,
        category: &str,
    ) -> anyhow::Result<Option<ArticleLink>> {
        let anchor = if driver.tag_name(element)? == "a" {
            element.clone()
        } else {
            driver.find_first(Scope::Within(element), self.selectors.card_title_link)?
        };
        let title = driver.text(&anchor)?.trim().to_string();
        let link = driver.attribute(&anchor, "href")?.unwrap_or_default();
        if title.is_empty() || link.is_empty() {
            return Ok(None);
        }
        Ok(Some(ArticleLink {
            title,
            link,
            category: category.to_string(),
        }))
    }

    /// Reads the article page the driver is currently on.
    ///
    /// `content_file` and `table_file` are left empty; whoever writes the
    /// per-article files fills them in.
    pub fn details<D: Driver>(&self, driver: &D, link: &ArticleLink) -> anyhow::Result<ArticleRecord> {
        let s = self.selectors;
        let raw_content = self.body_text(driver)?;

        let categories = all_texts(driver, Scope::Page, s.categories);
        let paragraphs = all_texts(driver, Scope::Page, s.paragraphs);
        let headings = all_texts(driver, Scope::Page, s.headings);
        let list_items = all_texts(driver, Scope::Page, s.list_items);
        let tables = self.tables(driver);

        let image_url = first_present(driver, Scope::Page, s.image)
            .first()
            .and_then(|img| driver.attribute(img, "src").ok().flatten())
            .filter(|src| !src.is_empty())
            .unwrap_or_else(|| NO_IMAGE.to_string());

        let cards = card_mentions(&raw_content);

        Ok(ArticleRecord {
            title: link.title.clone(),
            link: link.link.clone(),
            publish_date: self.publish_date(driver),
            categories: if categories.is_empty() {
                UNCATEGORIZED.to_string()
            } else {
                categories.join(", ")
            },
            image_url,
            mentioned_cards: if cards.is_empty() {
                NO_CARD_MENTIONED.to_string()
            } else {
                cards.into_iter().collect::<Vec<_>>().join(", ")
            },
            heading_count: headings.len(),
            paragraph_count: paragraphs.len(),
            list_item_count: list_items.len(),
            table_count: tables.len(),
            full_content: compose_full_content(&headings, &paragraphs, &list_items),
            raw_content,
            paragraphs,
            headings,
            list_items,
            tables,
            table_file: None,
            content_file: String::new(),
        })
    }

    /// Article container → its content area → the whole container →
    /// readability over the page → placeholder.
    fn body_text<D: Driver>(&self, driver: &D) -> anyhow::Result<String> {
        let s = self.selectors;
        if let Some(article) = first_present(driver, Scope::Page, s.article_container).first() {
            let content = first_text(driver, Scope::Within(article), s.content_container, "");
            if !content.is_empty() {
                return Ok(content);
            }
            let whole = driver.text(article)?.trim().to_string();
            if !whole.is_empty() {
                return Ok(whole);
            }
        }

        let html = driver.page_source()?;
        let url = Url::parse(&driver.current_url()?)?;
        let mut reader = Cursor::new(html.as_bytes());
        match readability::extractor::extract(&mut reader, &url) {
            Ok(product) if !product.text.trim().is_empty() => Ok(product.text.trim().to_string()),
            Ok(_) => Ok(NO_CONTENT.to_string()),
            Err(e) => {
                debug!(error = ?e, "readability found no article body");
                Ok(NO_CONTENT.to_string())
            }
        }
    }

    fn publish_date<D: Driver>(&self, driver: &D) -> String {
        let Ok(nodes) = driver.find_all(Scope::Page, self.selectors.publish_date) else {
            return UNKNOWN_DATE.to_string();
        };
        for node in &nodes {
            let date = match driver.tag_name(node).as_deref() {
                Ok("meta") => driver
                    .attribute(node, "content")
                    .ok()
                    .flatten()
                    .and_then(|c| c.split('T').next().map(str::to_string)),
                Ok(_) => driver.text(node).ok(),
                Err(_) => None,
            };
            if let Some(date) = date.map(|d| d.trim().to_string()) {
                if !date.is_empty() {
                    return date;
                }
            }
        }
        UNKNOWN_DATE.to_string()
    }

    fn tables<D: Driver>(&self, driver: &D) -> Vec<Vec<Vec<String>>> {
        let s = self.selectors;
        let mut tables = Vec::new();
        for table in first_present(driver, Scope::Page, s.tables) {
            let Ok(rows) = driver.find_all(Scope::Within(&table), s.table_rows) else {
                continue;
            };
            let grid: Vec<Vec<String>> = rows
                .iter()
                .filter_map(|row| driver.find_all(Scope::Within(row), s.table_cells).ok())
                .map(|cells| {
                    cells
                        .iter()
                        .map(|c| driver.text(c).unwrap_or_default().trim().to_string())
                        .collect::<Vec<_>>()
                })
                .filter(|row| !row.is_empty())
                .collect();
            if !grid.is_empty() {
                tables.push(grid);
            }
        }
        tables
    }
}

/// Category slug of a blog listing URL: the path after `/category/`, or
/// the last path segment when there is none.
pub fn category_from_url(url: &str) -> String {
    if let Some((_, rest)) = url.split_once("/category/") {
        return rest.trim_matches('/').to_string();
    }
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Distinct card names mentioned in `text`, sorted.
pub fn card_mentions(text: &str) -> BTreeSet<String> {
    let mut cards = BTreeSet::new();
    for pattern in CARD_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let groups: Vec<&str> = caps
                .iter()
                .skip(1)
                .flatten()
                .map(|m| m.as_str())
                .collect();
            let card = match groups.as_slice() {
                [single] => format!("{single}信用卡"),
                many => many.concat(),
            };
            cards.insert(card);
        }
    }
    cards
}

pub fn compose_full_content(headings: &[String], paragraphs: &[String], list_items: &[String]) -> String {
    let section = |title: &str, body: String, empty: &str| {
        if body.is_empty() {
            format!("## {title}\n{empty}")
        } else {
            format!("## {title}\n{body}")
        }
    };
    [
        section("文章標題", headings.join("\n"), "無標題"),
        section("文章段落", paragraphs.join("\n\n"), "無段落內容"),
        section("文章列表", list_items.join("\n"), "無列表內容"),
    ]
    .join("\n\n")
}
