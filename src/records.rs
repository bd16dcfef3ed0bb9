//! Typed records, one per page template.
//!
//! Field names serialize to the site's own labels so the JSON archive reads
//! the same as the page. Every field is always present; extractors fill
//! missing data with defaults.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Ordered label → value pairs from a label/value block.
///
/// Insertion order is kept (it is the on-page order); inserting an existing
/// label replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap(Vec<(String, String)>);

impl LabelMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, value: impl Into<String>) {
        let label = label.into();
        let value = value.into();
        match self.0.iter_mut().find(|(l, _)| *l == label) {
            Some(slot) => slot.1 = value,
            None => self.0.push((label, value)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(l, v)| (l.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for LabelMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, value) in &self.0 {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Activity {
    #[serde(rename = "活動名稱")]
    pub name: String,
    #[serde(rename = "活動倒數")]
    pub countdown: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub url: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreditCardRecord {
    #[serde(rename = "卡片名稱")]
    pub name: String,
    #[serde(rename = "分類標籤")]
    pub tags: Vec<String>,
    #[serde(rename = "首刷活動")]
    pub activity: Activity,
    #[serde(rename = "首刷禮")]
    pub gifts: Vec<String>,
    #[serde(rename = "卡片回饋")]
    pub rewards: LabelMap,
    #[serde(rename = "立即申請按鈕")]
    pub apply_button: String,
    #[serde(rename = "詳細頁連結")]
    pub detail_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanButtons {
    #[serde(rename = "申請按鈕")]
    pub apply: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoanRecord {
    #[serde(rename = "貸款名稱")]
    pub name: String,
    #[serde(rename = "貸款資訊")]
    pub info: LabelMap,
    #[serde(rename = "特色亮點")]
    pub highlights: Vec<String>,
    #[serde(rename = "活動資訊")]
    pub activity: Activity,
    #[serde(rename = "分類標籤")]
    pub tags: Vec<String>,
    #[serde(rename = "廣告橫幅")]
    pub banner: Banner,
    #[serde(rename = "操作按鈕")]
    pub buttons: LoanButtons,
    #[serde(rename = "詳細頁連結")]
    pub detail_link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountButtons {
    #[serde(rename = "開戶按鈕")]
    pub open_account: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountRecord {
    #[serde(rename = "券商名稱")]
    pub name: String,
    #[serde(rename = "券商資訊")]
    pub broker_info: LabelMap,
    #[serde(rename = "特色亮點")]
    pub highlights: Vec<String>,
    #[serde(rename = "手續費資訊")]
    pub fee_info: LabelMap,
    #[serde(rename = "優惠活動")]
    pub promotions: Vec<String>,
    #[serde(rename = "活動資訊")]
    pub activity: Activity,
    #[serde(rename = "分類標籤")]
    pub tags: Vec<String>,
    #[serde(rename = "廣告橫幅")]
    pub banner: Banner,
    #[serde(rename = "操作按鈕")]
    pub buttons: AccountButtons,
    #[serde(rename = "詳細頁連結")]
    pub detail_link: String,
}

/// One entry on a blog category listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleLink {
    #[serde(rename = "標題")]
    pub title: String,
    #[serde(rename = "連結")]
    pub link: String,
    #[serde(rename = "分類")]
    pub category: String,
}

/// Everything read from one article page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    #[serde(rename = "標題")]
    pub title: String,
    #[serde(rename = "連結")]
    pub link: String,
    #[serde(rename = "發佈日期")]
    pub publish_date: String,
    #[serde(rename = "分類")]
    pub categories: String,
    #[serde(rename = "圖片連結")]
    pub image_url: String,
    #[serde(rename = "提到的信用卡")]
    pub mentioned_cards: String,
    #[serde(rename = "標題數量")]
    pub heading_count: usize,
    #[serde(rename = "段落數量")]
    pub paragraph_count: usize,
    #[serde(rename = "列表項數量")]
    pub list_item_count: usize,
    #[serde(rename = "表格數量")]
    pub table_count: usize,
    #[serde(rename = "完整內容")]
    pub full_content: String,
    #[serde(rename = "原始內容")]
    pub raw_content: String,
    #[serde(rename = "段落內容")]
    pub paragraphs: Vec<String>,
    #[serde(rename = "標題內容")]
    pub headings: Vec<String>,
    #[serde(rename = "列表內容")]
    pub list_items: Vec<String>,
    /// Table grids; written to their own file, not archived inline.
    #[serde(skip)]
    pub tables: Vec<Vec<Vec<String>>>,
    #[serde(rename = "表格檔案", skip_serializing_if = "Option::is_none")]
    pub table_file: Option<String>,
    #[serde(rename = "內容檔案")]
    pub content_file: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_map_keeps_order_and_replaces_in_place() {
        let mut map = LabelMap::new();
        map.insert("年利率", "2.5%");
        map.insert("額度", "100萬");
        map.insert("年利率", "1.9%");

        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs, vec![("年利率", "1.9%"), ("額度", "100萬")]);
    }

    #[test]
    fn test_record_serializes_with_site_labels() {
        let mut rewards = LabelMap::new();
        rewards.insert("國內", "1%");
        let record = CreditCardRecord {
            name: "Test Card".into(),
            tags: vec!["現金回饋".into()],
            activity: Activity::default(),
            gifts: vec![],
            rewards,
            apply_button: "立即申請".into(),
            detail_link: String::new(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["卡片名稱"], "Test Card");
        assert_eq!(json["首刷活動"]["活動倒數"], "");
        assert_eq!(json["卡片回饋"]["國內"], "1%");
    }
}
