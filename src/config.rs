use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::checkpoint::DEFAULT_CHECKPOINT_EVERY;
use crate::pagination::{PaginationConfig, DEFAULT_URL_PATTERN};

pub const DEFAULT_BLOG_CATEGORIES: &[&str] = &[
    "https://roo.cash/blog/category/roo-creditcard/",
    "https://roo.cash/blog/category/roo-loan/",
    "https://roo.cash/blog/category/roo-insurance/",
    "https://roo.cash/blog/category/roo-investment/",
    "https://roo.cash/blog/category/roo-news/",
    "https://roo.cash/blog/category/roo-life-discount/",
];

/// Run configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub headless: bool,
    pub page_load_timeout: Duration,
    pub element_wait_timeout: Duration,
    pub max_pages: usize,
    pub checkpoint_every: usize,
    pub credit_card_url: String,
    pub personal_loan_url: String,
    pub securities_url: String,
    pub blog_categories: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup; unset or unparsable keys fall
    /// back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let number = |key: &str, default: u64| match lookup(key) {
            Some(raw) => raw.trim().parse::<u64>().unwrap_or_else(|_| {
                warn!(key, value = %raw, default, "not a number, using default");
                default
            }),
            None => default,
        };

        let blog_categories = match lookup("ROOCASH_BLOG_CATEGORIES") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => DEFAULT_BLOG_CATEGORIES.iter().map(|s| s.to_string()).collect(),
        };

        Self {
            output_dir: PathBuf::from(string("ROOCASH_OUTPUT_DIR", "output")),
            headless: !matches!(
                string("ROOCASH_HEADLESS", "true").trim().to_ascii_lowercase().as_str(),
                "false" | "0" | "no"
            ),
            page_load_timeout: Duration::from_secs(number("ROOCASH_PAGE_LOAD_TIMEOUT_SECS", 3)),
            element_wait_timeout: Duration::from_secs(number("ROOCASH_ELEMENT_WAIT_TIMEOUT_SECS", 3)),
            max_pages: number("ROOCASH_MAX_PAGES", 10) as usize,
            checkpoint_every: number("ROOCASH_CHECKPOINT_EVERY", DEFAULT_CHECKPOINT_EVERY as u64)
                as usize,
            credit_card_url: string("ROOCASH_CREDIT_CARD_URL", "https://roo.cash/creditcard"),
            personal_loan_url: string("ROOCASH_PERSONAL_LOAN_URL", "https://roo.cash/personal-loan"),
            securities_url: string(
                "ROOCASH_SECURITIES_URL",
                "https://roo.cash/securities/account-recommendation",
            ),
            blog_categories,
        }
    }

    pub fn pagination(&self) -> PaginationConfig {
        PaginationConfig {
            max_pages: self.max_pages,
            url_pattern: DEFAULT_URL_PATTERN.to_string(),
            reveal_wait: Duration::from_secs(1),
            render_wait: self.page_load_timeout,
        }
    }
}
