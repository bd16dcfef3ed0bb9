//! Run orchestration: open a listing, walk it, extract, checkpoint, save.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::checkpoint::{CheckpointSink, SinkReport};
use crate::config::Settings;
use crate::driver::Driver;
use crate::error::{CrawlError, Result};
use crate::extract::article::{category_from_url, ArticleExtractor};
use crate::extract::{AccountExtractor, CreditCardExtractor, LoanExtractor, ProductExtractor};
use crate::pagination::{listing_items, PageControls, Paginator};
use crate::records::{ArticleLink, ArticleRecord};
use crate::storage::{run_timestamp, StorageManager};

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";
const SCROLL_TO_TOP: &str = "window.scrollTo(0, 0);";
const SCROLL_HEIGHT: &str = "document.body.scrollHeight";
const MAX_SCROLL_ROUNDS: usize = 20;
const SCROLL_PAUSE: Duration = Duration::from_millis(500);
/// Every n-th card is scrolled into view before it is read.
const ITEM_SCROLL_EVERY: usize = 3;
const ITEM_SCROLL_PAUSE: Duration = Duration::from_millis(100);

const ARTICLE_LINKS_STEM: &str = "roocash_all_articles";
const ARTICLE_DETAILS_STEM: &str = "roocash_article_details";

/// What a run can be asked to crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Kind {
    CreditCard,
    PersonalLoan,
    SecuritiesAccount,
    Articles,
}

impl Kind {
    pub const ALL: [Kind; 4] = [
        Kind::CreditCard,
        Kind::PersonalLoan,
        Kind::SecuritiesAccount,
        Kind::Articles,
    ];

    /// File name stem of this kind's artifacts.
    pub fn stem(self) -> &'static str {
        match self {
            Kind::CreditCard => "roocash_credit_cards",
            Kind::PersonalLoan => "roocash_personal_loans",
            Kind::SecuritiesAccount => "roocash_securities_accounts",
            Kind::Articles => ARTICLE_DETAILS_STEM,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub label: String,
    pub found: usize,
    pub extracted: usize,
    pub failed: usize,
    pub artifacts: Vec<PathBuf>,
}

impl RunSummary {
    fn from_report<R>(label: &str, found: usize, report: &SinkReport<R>) -> Self {
        let mut artifacts = Vec::new();
        if let Some(a) = &report.artifacts {
            artifacts.push(a.json.clone());
            artifacts.push(a.csv.clone());
        }
        Self {
            label: label.to_string(),
            found,
            extracted: report.records.len(),
            failed: report.failed,
            artifacts,
        }
    }

    pub fn log(&self) {
        info!(
            run = %self.label,
            found = self.found,
            extracted = self.extracted,
            failed = self.failed,
            "run finished"
        );
        for path in &self.artifacts {
            info!(run = %self.label, path = %path.display(), "artifact");
        }
    }
}

pub struct Crawler<'a, D: Driver> {
    driver: &'a D,
    storage: &'a StorageManager,
    settings: &'a Settings,
    timestamp: String,
}

impl<'a, D: Driver> Crawler<'a, D> {
    pub fn new(driver: &'a D, storage: &'a StorageManager, settings: &'a Settings) -> Self {
        Self {
            driver,
            storage,
            settings,
            timestamp: run_timestamp(),
        }
    }

    /// Overrides the artifact timestamp, which otherwise is the start time.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    pub async fn run(&self, kind: Kind) -> Result<RunSummary> {
        let s = self.settings;
        match kind {
            Kind::CreditCard => {
                self.crawl_products(&CreditCardExtractor::default(), &s.credit_card_url, kind.stem())
                    .await
            }
            Kind::PersonalLoan => {
                self.crawl_products(&LoanExtractor::default(), &s.personal_loan_url, kind.stem())
                    .await
            }
            Kind::SecuritiesAccount => {
                self.crawl_products(&AccountExtractor::default(), &s.securities_url, kind.stem())
                    .await
            }
            Kind::Articles => self.crawl_articles(&s.blog_categories).await,
        }
    }

    fn navigate(&self, url: &str) -> Result<()> {
        info!(%url, "navigating");
        self.driver
            .navigate(url)
            .map_err(|source| CrawlError::Navigation {
                url: url.to_string(),
                source,
            })
    }

    /// One product listing page: every card on it, each extracted in
    /// isolation so a bad card costs only itself.
    pub async fn crawl_products<X: ProductExtractor>(
        &self,
        extractor: &X,
        url: &str,
        stem: &str,
    ) -> Result<RunSummary> {
        self.navigate(url)?;
        let listing = extractor.listing();
        let items = match self
            .driver
            .wait_for(listing.ready, self.settings.page_load_timeout)
        {
            Ok(()) => {
                self.load_lazy_content().await;
                listing_items(self.driver, listing)
            }
            Err(e) => {
                warn!(kind = X::LABEL, error = %e, "listing never became ready");
                Vec::new()
            }
        };
        info!(kind = X::LABEL, count = items.len(), "listing items found");

        let mut sink = CheckpointSink::new(self.storage, stem, self.settings.checkpoint_every);
        for (i, item) in items.iter().enumerate() {
            if i % ITEM_SCROLL_EVERY == 0 {
                if let Err(e) = self.driver.scroll_into_view(item) {
                    debug!(index = i + 1, error = %e, "scroll into view failed");
                }
                sleep(ITEM_SCROLL_PAUSE).await;
            }
            match extractor.extract(self.driver, item, i + 1) {
                Ok(record) => sink.push(record),
                Err(e) => {
                    warn!(kind = X::LABEL, index = i + 1, error = %e, "skipping item");
                    sink.record_failure();
                }
            }
        }

        let report = sink.finish(&self.timestamp);
        Ok(RunSummary::from_report(X::LABEL, items.len(), &report))
    }

    /// Scrolls to the bottom until the page stops growing, then back up.
    async fn load_lazy_content(&self) {
        let mut last = self.scroll_height();
        for _ in 0..MAX_SCROLL_ROUNDS {
            if let Err(e) = self.driver.execute_script(SCROLL_TO_BOTTOM) {
                debug!(error = %e, "scroll failed");
                break;
            }
            sleep(SCROLL_PAUSE).await;
            let height = self.scroll_height();
            if height.is_none() || height == last {
                break;
            }
            last = height;
        }
        if let Err(e) = self.driver.execute_script(SCROLL_TO_TOP) {
            debug!(error = %e, "scroll to top failed");
        }
        sleep(SCROLL_PAUSE).await;
    }

    fn scroll_height(&self) -> Option<u64> {
        self.driver.execute_script(SCROLL_HEIGHT).ok()?.as_u64()
    }

    /// Article links from one paginated category listing, deduplicated by
    /// link. The driver must already show `base_url`.
    pub async fn get_all_articles(&self, base_url: &str) -> Vec<ArticleLink> {
        let extractor = ArticleExtractor::default();
        let selectors = extractor.selectors();
        let category = category_from_url(base_url);
        let mut paginator = Paginator::new(
            self.driver,
            base_url,
            selectors.listing,
            PageControls {
                numbered: selectors.numbered_page_links,
                next: selectors.next_page_link,
            },
            self.settings.pagination(),
        );
        let links = paginator
            .harvest(|driver, node| extractor.entry(driver, node, &category))
            .await;
        info!(%base_url, count = links.len(), "category collected");
        links
    }

    /// Every category's links. The accumulated list is checkpointed after
    /// each category; a category that cannot be opened is skipped.
    pub async fn collect_article_links(&self, categories: &[String]) -> Vec<ArticleLink> {
        let mut all: Vec<ArticleLink> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let temp = format!("{ARTICLE_LINKS_STEM}_temp.csv");

        for url in categories {
            if let Err(e) = self.navigate(url) {
                error!(error = %e, "skipping category");
                continue;
            }
            sleep(self.settings.page_load_timeout).await;

            for link in self.get_all_articles(url).await {
                if seen.insert(link.link.clone()) {
                    all.push(link);
                }
            }
            if let Err(e) = self.storage.store_flat(&temp, &all) {
                error!(error = %e, "article link checkpoint failed");
            }
            info!(total = all.len(), "article links so far");
        }
        all
    }

    /// Visits each article and extracts its details, writing the
    /// per-article files as it goes.
    pub async fn scrape_article_details(&self, links: &[ArticleLink]) -> SinkReport<ArticleRecord> {
        let extractor = ArticleExtractor::default();
        let mut sink = CheckpointSink::new(self.storage, ARTICLE_DETAILS_STEM, self.settings.checkpoint_every);

        for (i, link) in links.iter().enumerate() {
            info!(n = i + 1, total = links.len(), title = %link.title, "article");
            if let Err(e) = self.navigate(&link.link) {
                warn!(error = %e, "skipping article");
                sink.record_failure();
                continue;
            }
            sleep(self.settings.page_load_timeout).await;

            match extractor.details(self.driver, link) {
                Ok(mut record) => {
                    if let Err(e) = self.storage.store_article_files(i + 1, &mut record) {
                        error!(error = %e, link = %link.link, "article files not written");
                    }
                    sink.push(record);
                }
                Err(e) => {
                    warn!(link = %link.link, error = %e, "skipping article");
                    sink.record_failure();
                }
            }
        }
        sink.finish(&self.timestamp)
    }

    /// Links from every category, saved, then the details of each.
    pub async fn crawl_articles(&self, categories: &[String]) -> Result<RunSummary> {
        let links = self.collect_article_links(categories).await;
        let mut link_artifacts = Vec::new();
        match self.storage.store_records(ARTICLE_LINKS_STEM, &self.timestamp, &links) {
            Ok(a) => link_artifacts.extend([a.json, a.csv]),
            Err(e) => error!(error = %e, "article link list not saved"),
        }

        let report = self.scrape_article_details(&links).await;
        let mut summary = RunSummary::from_report("articles", links.len(), &report);
        link_artifacts.append(&mut summary.artifacts);
        summary.artifacts = link_artifacts;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::SnapshotDriver;

    fn settings(dir: &std::path::Path) -> Settings {
        Settings {
            output_dir: dir.to_path_buf(),
            ..Settings::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_listing_yields_empty_run() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let storage = StorageManager::new(dir.path()).unwrap();
        let driver = SnapshotDriver::new();

        let summary = Crawler::new(&driver, &storage, &settings)
            .with_timestamp("20240101_000000")
            .run(Kind::CreditCard)
            .await
            .unwrap();
        assert_eq!(summary.found, 0);
        assert_eq!(summary.extracted, 0);
        assert_eq!(summary.artifacts.len(), 2);
    }

    #[test]
    fn test_kind_stems_are_distinct() {
        let stems: HashSet<_> = Kind::ALL.iter().map(|k| k.stem()).collect();
        assert_eq!(stems.len(), Kind::ALL.len());
    }
}
