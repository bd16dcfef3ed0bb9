pub mod checkpoint;
pub mod config;
pub mod crawler;
pub mod driver;
pub mod error;
pub mod extract;
pub mod flatten;
pub mod locator;
pub mod pagination;
pub mod records;
pub mod selectors;
pub mod storage;

pub use config::Settings;
pub use driver::{Driver, Scope};
pub use error::CrawlError;
