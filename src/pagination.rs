//! Walks a paginated listing one page at a time.
//!
//! Advancing tries, in order: the numbered link for the next page, the
//! generic "next" link, then the site's page URL pattern. A strategy that
//! errors or finds nothing hands over to the next one; when all of them
//! fail, or the page ceiling is reached, the walk is exhausted.

use std::collections::HashSet;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::driver::{Driver, Scope};
use crate::records::ArticleLink;
use crate::selectors::ListingSelectors;

pub const NOT_FOUND_TITLE: &str = "Page not found";
pub const DEFAULT_URL_PATTERN: &str = "{base}/page/{page}/";

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

#[derive(Debug, Clone)]
pub struct PaginationConfig {
    pub max_pages: usize,
    /// `{base}` is the listing URL without its trailing slash, `{page}` the
    /// 1-based page number.
    pub url_pattern: String,
    /// Pause after scrolling controls into view.
    pub reveal_wait: Duration,
    /// Pause after a page change for the new listing to render.
    pub render_wait: Duration,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            max_pages: 10,
            url_pattern: DEFAULT_URL_PATTERN.to_string(),
            reveal_wait: Duration::from_secs(1),
            render_wait: Duration::from_secs(3),
        }
    }
}

impl PaginationConfig {
    pub fn page_url(&self, base: &str, page: usize) -> String {
        self.url_pattern
            .replace("{base}", base.trim_end_matches('/'))
            .replace("{page}", &page.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    OnPage(usize),
    Advancing(usize),
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceStrategy {
    NumberedLink,
    NextLink,
    UrlPattern,
}

impl AdvanceStrategy {
    pub const CHAIN: [AdvanceStrategy; 3] = [
        AdvanceStrategy::NumberedLink,
        AdvanceStrategy::NextLink,
        AdvanceStrategy::UrlPattern,
    ];
}

/// Page controls used by the first two advance strategies.
#[derive(Debug, Clone, Copy)]
pub struct PageControls {
    pub numbered: &'static str,
    pub next: &'static str,
}

/// Items on the current page: the primary selector, else the secondary.
pub fn listing_items<D: Driver>(driver: &D, listing: &ListingSelectors) -> Vec<D::Node> {
    for selector in [listing.primary, listing.secondary] {
        match driver.find_all(Scope::Page, selector) {
            Ok(items) if !items.is_empty() => return items,
            Ok(_) => debug!(selector, "no listing items"),
            Err(e) => debug!(selector, error = %e, "listing selector failed"),
        }
    }
    Vec::new()
}

/// Anything collected from a listing that has a stable identity.
pub trait Identified {
    fn identity(&self) -> &str;
}

impl Identified for ArticleLink {
    fn identity(&self) -> &str {
        &self.link
    }
}

pub struct Paginator<'d, D: Driver> {
    driver: &'d D,
    base_url: String,
    listing: ListingSelectors,
    controls: PageControls,
    config: PaginationConfig,
    state: PageState,
    seen: HashSet<String>,
}

impl<'d, D: Driver> Paginator<'d, D> {
    /// Starts on page 1; the driver must already be showing `base_url`.
    pub fn new(
        driver: &'d D,
        base_url: impl Into<String>,
        listing: ListingSelectors,
        controls: PageControls,
        config: PaginationConfig,
    ) -> Self {
        Self {
            driver,
            base_url: base_url.into(),
            listing,
            controls,
            config,
            state: PageState::OnPage(1),
            seen: HashSet::new(),
        }
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn collect_items(&self) -> Vec<D::Node> {
        listing_items(self.driver, &self.listing)
    }

    /// Records `identity` as seen; false if it already was.
    pub fn admit(&mut self, identity: &str) -> bool {
        self.seen.insert(identity.to_string())
    }

    /// Collects every page's items through `read`, skipping entries whose
    /// identity was already collected. Entries `read` fails on are logged
    /// and dropped.
    pub async fn harvest<T, F>(&mut self, mut read: F) -> Vec<T>
    where
        T: Identified,
        F: FnMut(&D, &D::Node) -> anyhow::Result<Option<T>>,
    {
        let mut out = Vec::new();
        while let PageState::OnPage(page) = self.state {
            info!(page, url = %self.base_url, "collecting listing page");
            let items = self.collect_items();
            if items.is_empty() {
                info!(page, "no items on page, stopping");
                self.state = PageState::Exhausted;
                break;
            }
            let before = out.len();
            for item in &items {
                match read(self.driver, item) {
                    Ok(Some(entry)) => {
                        if self.admit(entry.identity()) {
                            out.push(entry);
                        }
                    }
                    Ok(None) => {}
                    Err(e) => warn!(page, error = %e, "skipping listing entry"),
                }
            }
            info!(page, new = out.len() - before, total = out.len(), "page collected");
            self.advance().await;
        }
        out
    }

    /// Moves to the next page, or to `Exhausted`.
    pub async fn advance(&mut self) -> PageState {
        let PageState::OnPage(page) = self.state else {
            return self.state;
        };
        if page >= self.config.max_pages {
            info!(page, max_pages = self.config.max_pages, "page ceiling reached");
            self.state = PageState::Exhausted;
            return self.state;
        }

        self.state = PageState::Advancing(page);
        if let Err(e) = self.driver.execute_script(SCROLL_TO_BOTTOM) {
            debug!(error = %e, "could not scroll to page controls");
        }
        sleep(self.config.reveal_wait).await;

        let target = page + 1;
        for strategy in AdvanceStrategy::CHAIN {
            match self.try_strategy(strategy, target).await {
                Ok(true) => {
                    info!(?strategy, page = target, "advanced");
                    self.state = PageState::OnPage(target);
                    return self.state;
                }
                Ok(false) => debug!(?strategy, "strategy not applicable"),
                Err(e) => warn!(?strategy, error = %e, "advance strategy failed"),
            }
        }

        info!(page, "no further pages");
        self.state = PageState::Exhausted;
        self.state
    }

    async fn try_strategy(&self, strategy: AdvanceStrategy, target: usize) -> anyhow::Result<bool> {
        match strategy {
            AdvanceStrategy::NumberedLink => {
                let links = self.driver.find_all(Scope::Page, self.controls.numbered)?;
                for link in links {
                    let label = match self.driver.text(&link) {
                        Ok(label) => label,
                        Err(e) => {
                            debug!(error = %e, "unreadable page link");
                            continue;
                        }
                    };
                    if label.trim().parse::<usize>().ok() == Some(target) {
                        self.activate(&link).await?;
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            AdvanceStrategy::NextLink => {
                let Some(link) = self
                    .driver
                    .find_all(Scope::Page, self.controls.next)?
                    .into_iter()
                    .next()
                else {
                    return Ok(false);
                };
                self.activate(&link).await?;
                Ok(true)
            }
            AdvanceStrategy::UrlPattern => {
                let url = self.config.page_url(&self.base_url, target);
                debug!(%url, "trying page URL directly");
                self.driver.navigate(&url)?;
                sleep(self.config.render_wait).await;
                Ok(self.page_has_content()?)
            }
        }
    }

    async fn activate(&self, link: &D::Node) -> anyhow::Result<()> {
        self.driver.scroll_into_view(link)?;
        sleep(self.config.reveal_wait).await;
        self.driver.click(link)?;
        sleep(self.config.render_wait).await;
        Ok(())
    }

    fn page_has_content(&self) -> anyhow::Result<bool> {
        if self.driver.title()?.contains(NOT_FOUND_TITLE) {
            return Ok(false);
        }
        Ok(!self.driver.find_all(Scope::Page, self.listing.ready)?.is_empty())
    }
}
