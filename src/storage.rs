//! Output artifacts on local disk.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use tracing::info;

use crate::error::{CrawlError, Result};
use crate::flatten::{Flatten, FlatRecord};
use crate::records::ArticleRecord;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Timestamp suffix for one run's final artifacts.
pub fn run_timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Paths written for one record set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub json: PathBuf,
    pub csv: PathBuf,
}

#[derive(Debug, Clone)]
pub struct StorageManager {
    root: PathBuf,
}

impl StorageManager {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| CrawlError::sink_write(&root, e.into()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    pub fn store_json<T: Serialize + ?Sized>(&self, file_name: &str, value: &T) -> Result<PathBuf> {
        let path = self.path(file_name);
        let write = || -> Result<()> {
            let body = serde_json::to_string_pretty(value)?;
            fs::write(&path, body)?;
            Ok(())
        };
        write().map_err(|e| CrawlError::sink_write(&path, e))?;
        Ok(path)
    }

    /// Writes `rows` under a header of `columns`, BOM-prefixed so
    /// spreadsheet tools pick up the encoding.
    pub fn store_csv(&self, file_name: &str, columns: &[&str], rows: &[FlatRecord]) -> Result<PathBuf> {
        let path = self.path(file_name);
        let write = || -> Result<()> {
            let mut file = File::create(&path)?;
            file.write_all(UTF8_BOM)?;
            let mut writer = csv::Writer::from_writer(file);
            writer.write_record(columns)?;
            for row in rows {
                writer.write_record(row.values())?;
            }
            writer.flush()?;
            Ok(())
        };
        write().map_err(|e| CrawlError::sink_write(&path, e))?;
        Ok(path)
    }

    pub fn store_text(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        let path = self.path(file_name);
        fs::write(&path, content).map_err(|e| CrawlError::sink_write(&path, e.into()))?;
        Ok(path)
    }

    /// Flattened rows of `records` as CSV.
    pub fn store_flat<R: Flatten>(&self, file_name: &str, records: &[R]) -> Result<PathBuf> {
        let rows: Vec<FlatRecord> = records.iter().map(Flatten::flatten).collect();
        self.store_csv(file_name, R::COLUMNS, &rows)
    }

    /// The authoritative `{stem}_{timestamp}` JSON and CSV pair.
    pub fn store_records<R: Flatten + Serialize>(
        &self,
        stem: &str,
        timestamp: &str,
        records: &[R],
    ) -> Result<Artifacts> {
        let json = self.store_json(&format!("{stem}_{timestamp}.json"), records)?;
        let csv = self.store_flat(&format!("{stem}_{timestamp}.csv"), records)?;
        info!(count = records.len(), json = %json.display(), csv = %csv.display(), "records saved");
        Ok(Artifacts { json, csv })
    }

    /// Writes `article_N_content.txt` and, when the article has tables,
    /// `article_N_tables.txt`, and records both paths on `record`.
    pub fn store_article_files(&self, index: usize, record: &mut ArticleRecord) -> Result<()> {
        if !record.tables.is_empty() {
            let path = self.store_text(
                &format!("article_{index}_tables.txt"),
                &render_tables(&record.tables),
            )?;
            record.table_file = Some(path.display().to_string());
        }
        let path = self.store_text(
            &format!("article_{index}_content.txt"),
            &render_article_content(record),
        )?;
        record.content_file = path.display().to_string();
        Ok(())
    }
}

pub fn render_article_content(record: &ArticleRecord) -> String {
    format!(
        "標題: {}\n\n連結: {}\n\n發布日期: {}\n\n分類: {}\n\n完整內容:\n\n{}",
        record.title, record.link, record.publish_date, record.categories, record.full_content
    )
}

pub fn render_tables(tables: &[Vec<Vec<String>>]) -> String {
    let mut out = String::new();
    for (n, table) in tables.iter().enumerate() {
        out.push_str(&format!("表格 {}:\n", n + 1));
        for row in table {
            out.push_str(&row.join(" | "));
            out.push('\n');
        }
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::ArticleLink;

    fn links() -> Vec<ArticleLink> {
        vec![
            ArticleLink {
                title: "信用卡, 懶人包".into(),
                link: "https://roo.cash/blog/a/".into(),
                category: "roo-creditcard".into(),
            },
            ArticleLink {
                title: "B".into(),
                link: "https://roo.cash/blog/b/".into(),
                category: "roo-loan".into(),
            },
        ]
    }

    #[test]
    fn test_csv_has_bom_header_and_quoted_rows() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();

        let path = storage.store_flat("links.csv", &links()).unwrap();
        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("標題,連結,分類"));
        assert_eq!(
            lines.next(),
            Some("\"信用卡, 懶人包\",https://roo.cash/blog/a/,roo-creditcard")
        );
    }

    #[test]
    fn test_store_records_writes_timestamped_pair() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path().join("nested")).unwrap();

        let artifacts = storage
            .store_records("roocash_all_articles", "20240101_120000", &links())
            .unwrap();
        assert!(artifacts.json.ends_with("roocash_all_articles_20240101_120000.json"));
        assert!(artifacts.csv.ends_with("roocash_all_articles_20240101_120000.csv"));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&artifacts.json).unwrap()).unwrap();
        assert_eq!(json[1]["連結"], "https://roo.cash/blog/b/");
    }

    #[test]
    fn test_render_tables() {
        let tables = vec![vec![
            vec!["卡片".to_string(), "回饋".to_string()],
            vec!["Pi".to_string(), "5%".to_string()],
        ]];
        assert_eq!(render_tables(&tables), "表格 1:\n卡片 | 回饋\nPi | 5%\n\n\n");
    }

    #[test]
    fn test_write_failure_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        fs::create_dir(dir.path().join("taken.json")).unwrap();

        let err = storage.store_json("taken.json", &links()).unwrap_err();
        match err {
            CrawlError::SinkWrite { path, .. } => assert!(path.ends_with("taken.json")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
