//! Nested records → fixed-schema flat rows for CSV export.

use crate::records::{
    AccountRecord, ArticleLink, ArticleRecord, CreditCardRecord, LabelMap, LoanRecord,
};

pub const LIST_SEPARATOR: &str = ", ";

/// One tabular row. Columns always match the record type's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRecord {
    columns: &'static [&'static str],
    values: Vec<String>,
}

impl FlatRecord {
    fn new(columns: &'static [&'static str], values: Vec<String>) -> Self {
        debug_assert_eq!(
            columns.len(),
            values.len(),
            "flat row does not match its column schema"
        );
        Self { columns, values }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| *c == column)
            .map(|i| self.values[i].as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.columns
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }
}

pub trait Flatten {
    const COLUMNS: &'static [&'static str];

    fn flatten(&self) -> FlatRecord;
}

pub fn join_list(items: &[String]) -> String {
    items.join(LIST_SEPARATOR)
}

pub fn join_pairs(map: &LabelMap) -> String {
    map.iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

impl Flatten for CreditCardRecord {
    const COLUMNS: &'static [&'static str] = &[
        "卡片名稱",
        "分類標籤",
        "活動名稱",
        "活動倒數",
        "首刷禮",
        "卡片回饋",
        "立即申請按鈕",
        "詳細頁連結",
    ];

    fn flatten(&self) -> FlatRecord {
        FlatRecord::new(
            Self::COLUMNS,
            vec![
                self.name.clone(),
                join_list(&self.tags),
                self.activity.name.clone(),
                self.activity.countdown.clone(),
                join_list(&self.gifts),
                join_pairs(&self.rewards),
                self.apply_button.clone(),
                self.detail_link.clone(),
            ],
        )
    }
}

impl Flatten for LoanRecord {
    // The banner is archived in JSON only.
    const COLUMNS: &'static [&'static str] = &[
        "貸款名稱",
        "貸款資訊",
        "特色亮點",
        "活動名稱",
        "活動倒數",
        "分類標籤",
        "申請按鈕",
        "詳細頁連結",
    ];

    fn flatten(&self) -> FlatRecord {
        FlatRecord::new(
            Self::COLUMNS,
            vec![
                self.name.clone(),
                join_pairs(&self.info),
                join_list(&self.highlights),
                self.activity.name.clone(),
                self.activity.countdown.clone(),
                join_list(&self.tags),
                self.buttons.apply.clone(),
                self.detail_link.clone(),
            ],
        )
    }
}

impl Flatten for AccountRecord {
    const COLUMNS: &'static [&'static str] = &[
        "券商名稱",
        "券商資訊",
        "特色亮點",
        "手續費資訊",
        "優惠活動",
        "活動名稱",
        "活動倒數",
        "分類標籤",
        "廣告橫幅_URL",
        "廣告橫幅_ALT",
        "開戶按鈕",
        "詳細頁連結",
    ];

    fn flatten(&self) -> FlatRecord {
        FlatRecord::new(
            Self::COLUMNS,
            vec![
                self.name.clone(),
                join_pairs(&self.broker_info),
                join_list(&self.highlights),
                join_pairs(&self.fee_info),
                join_list(&self.promotions),
                self.activity.name.clone(),
                self.activity.countdown.clone(),
                join_list(&self.tags),
                self.banner.url.clone(),
                self.banner.alt.clone(),
                self.buttons.open_account.clone(),
                self.detail_link.clone(),
            ],
        )
    }
}

impl Flatten for ArticleLink {
    const COLUMNS: &'static [&'static str] = &["標題", "連結", "分類"];

    fn flatten(&self) -> FlatRecord {
        FlatRecord::new(
            Self::COLUMNS,
            vec![self.title.clone(), self.link.clone(), self.category.clone()],
        )
    }
}

impl Flatten for ArticleRecord {
    // List fields and the two long text bodies stay out of the table; they
    // live in the JSON archive and the per-article content file.
    const COLUMNS: &'static [&'static str] = &[
        "標題",
        "連結",
        "發佈日期",
        "分類",
        "圖片連結",
        "提到的信用卡",
        "標題數量",
        "段落數量",
        "列表項數量",
        "表格數量",
        "表格檔案",
        "內容檔案",
    ];

    fn flatten(&self) -> FlatRecord {
        FlatRecord::new(
            Self::COLUMNS,
            vec![
                self.title.clone(),
                self.link.clone(),
                self.publish_date.clone(),
                self.categories.clone(),
                self.image_url.clone(),
                self.mentioned_cards.clone(),
                self.heading_count.to_string(),
                self.paragraph_count.to_string(),
                self.list_item_count.to_string(),
                self.table_count.to_string(),
                self.table_file.clone().unwrap_or_default(),
                self.content_file.clone(),
            ],
        )
    }
}
