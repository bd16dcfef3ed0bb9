use std::path::PathBuf;

/// Failures that escape a crawl run.
///
/// Selector misses, single-item failures and failed page advances are
/// recovered where they happen and never surface as a `CrawlError`.
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// The browser could not be started. Fatal for the whole run.
    #[error("browser initialisation failed: {0}")]
    DriverInit(#[source] anyhow::Error),

    /// The listing page for a run could not be opened.
    #[error("navigation to {url} failed: {source}")]
    Navigation {
        url: String,
        #[source]
        source: anyhow::Error,
    },

    /// Writing an output artifact failed. Collected data stays in memory.
    #[error("writing {path} failed: {source}")]
    SinkWrite {
        path: PathBuf,
        #[source]
        source: Box<CrawlError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CrawlError {
    pub(crate) fn sink_write(path: impl Into<PathBuf>, source: CrawlError) -> Self {
        CrawlError::SinkWrite {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, CrawlError>;
