use crate::driver::{Driver, Scope};
use crate::locator::{all_texts, first_attribute, first_text};
use crate::records::{Activity, LoanButtons, LoanRecord};
use crate::selectors::{ListingSelectors, LoanSelectors, PERSONAL_LOAN};

use super::{ensure_attached, extract_banner, extract_label_blocks, ProductExtractor};

const INFO_CAP: usize = 5;

pub struct LoanExtractor {
    selectors: &'static LoanSelectors,
}

impl Default for LoanExtractor {
    fn default() -> Self {
        Self {
            selectors: &PERSONAL_LOAN,
        }
    }
}

impl ProductExtractor for LoanExtractor {
    type Record = LoanRecord;
    const LABEL: &'static str = "personal loan";

    fn listing(&self) -> &ListingSelectors {
        &self.selectors.listing
    }

    fn extract<D: Driver>(&self, driver: &D, item: &D::Node, index: usize) -> anyhow::Result<LoanRecord> {
        ensure_attached(driver, item)?;
        let s = self.selectors;
        let scope = Scope::Within(item);

        Ok(LoanRecord {
            name: first_text(driver, scope, s.name, &format!("未知貸款產品 {index}")),
            info: extract_label_blocks(driver, item, s.info_blocks, s.info_label, s.info_value, INFO_CAP),
            highlights: all_texts(driver, scope, s.highlights),
            // Loan cards carry no countdown.
            activity: Activity {
                name: first_text(driver, scope, s.activity, ""),
                countdown: String::new(),
            },
            tags: all_texts(driver, scope, s.tags),
            banner: extract_banner(driver, item, s.banner),
            buttons: LoanButtons {
                apply: first_text(driver, scope, s.apply_button, "立即申請"),
            },
            detail_link: first_attribute(driver, scope, s.detail_link, "href", ""),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::SnapshotDriver;
    use crate::flatten::Flatten;

    const LISTING: &str = r#"
      <html><body>
        <div data-testid="product-card">
          <h3 data-testid="product-title">樂活信貸</h3>
          <div data-testid="product-content">
            <div class="border-l"><p class="text-xs">年利率</p><p class="font-bold">2.88%</p></div>
            <div class="border-l"><p class="text-xs">最高額度</p><p class="font-bold">300萬</p></div>
          </div>
          <div data-testid="product-highlight-1">快速撥款</div>
          <div data-testid="product-highlight-2">免手續費</div>
          <div data-testid="product-activity">新戶限定</div>
          <div data-testid="product-taxonomy">
            <div class="whitespace-nowrap rounded-full">信貸</div>
          </div>
          <div data-testid="product-banner"><img src="/img/banner.png" alt="秋季優惠"></div>
          <div data-testid="product-apply-cta">馬上申辦</div>
          <a data-testid="product-detail" href="/personal-loan/info/lohas">看更多</a>
        </div>
        <div data-testid="product-card"></div>
      </body></html>
    "#;

    fn cards() -> (SnapshotDriver, Vec<<SnapshotDriver as Driver>::Node>) {
        let driver = SnapshotDriver::new().with_page("https://roo.cash/personal-loan", LISTING);
        driver.navigate("https://roo.cash/personal-loan").unwrap();
        let cards = driver
            .find_all(Scope::Page, "div[data-testid='product-card']")
            .unwrap();
        (driver, cards)
    }

    #[test]
    fn test_full_loan_card() {
        let (d, cards) = cards();
        let record = LoanExtractor::default().extract(&d, &cards[0], 1).unwrap();

        assert_eq!(record.name, "樂活信貸");
        assert_eq!(record.info.get("年利率"), Some("2.88%"));
        assert_eq!(record.highlights, vec!["快速撥款", "免手續費"]);
        assert_eq!(record.activity.name, "新戶限定");
        assert_eq!(record.tags, vec!["信貸"]);
        assert_eq!(record.banner.url, "https://roo.cash/img/banner.png");
        assert_eq!(record.buttons.apply, "馬上申辦");

        let flat = record.flatten();
        assert_eq!(flat.get("貸款資訊"), Some("年利率: 2.88%, 最高額度: 300萬"));
        assert_eq!(flat.get("活動倒數"), Some(""));
    }

    #[test]
    fn test_empty_loan_card_gets_defaults() {
        let (d, cards) = cards();
        let record = LoanExtractor::default().extract(&d, &cards[1], 2).unwrap();

        assert_eq!(record.name, "未知貸款產品 2");
        assert!(record.info.is_empty());
        assert_eq!(record.banner.url, "");
        assert_eq!(record.buttons.apply, "立即申請");
        assert_eq!(record.detail_link, "");
    }
}
