use crate::driver::{Driver, Scope};
use crate::locator::{all_texts, first_attribute, first_text};
use crate::records::{AccountButtons, AccountRecord, Activity, LabelMap};
use crate::selectors::{AccountSelectors, ListingSelectors, SECURITIES_ACCOUNT};

use super::{ensure_attached, extract_banner, extract_label_blocks, ProductExtractor};

const BROKER_INFO_CAP: usize = 6;
const FEES_PER_SELECTOR: usize = 3;
const PROMOTIONS_PER_SELECTOR: usize = 5;

const FEE_KEYWORDS: &[&str] = &["手續費", "折", "%", "優惠", "免費"];
const PROMOTION_KEYWORDS: &[&str] = &["優惠", "活動", "贈", "送", "免費", "限時"];

pub struct AccountExtractor {
    selectors: &'static AccountSelectors,
}

impl Default for AccountExtractor {
    fn default() -> Self {
        Self {
            selectors: &SECURITIES_ACCOUNT,
        }
    }
}

impl ProductExtractor for AccountExtractor {
    type Record = AccountRecord;
    const LABEL: &'static str = "securities account";

    fn listing(&self) -> &ListingSelectors {
        &self.selectors.listing
    }

    fn extract<D: Driver>(
        &self,
        driver: &D,
        item: &D::Node,
        index: usize,
    ) -> anyhow::Result<AccountRecord> {
        ensure_attached(driver, item)?;
        let s = self.selectors;
        let scope = Scope::Within(item);

        Ok(AccountRecord {
            name: first_text(driver, scope, s.name, &format!("未知證券開戶產品 {index}")),
            broker_info: extract_label_blocks(
                driver,
                item,
                s.broker_blocks,
                s.broker_label,
                s.broker_value,
                BROKER_INFO_CAP,
            ),
            highlights: all_texts(driver, scope, s.highlights),
            fee_info: self.fee_info(driver, item),
            promotions: self.promotions(driver, item),
            activity: Activity {
                name: first_text(driver, scope, s.activity, ""),
                countdown: String::new(),
            },
            tags: all_texts(driver, scope, s.tags),
            banner: extract_banner(driver, item, s.banner),
            buttons: AccountButtons {
                open_account: first_text(driver, scope, s.apply_button, "立即開戶"),
            },
            detail_link: first_attribute(driver, scope, s.detail_link, "href", ""),
        })
    }
}

impl AccountExtractor {
    /// Every selector contributes; later matches overwrite the same class.
    fn fee_info<D: Driver>(&self, driver: &D, item: &D::Node) -> LabelMap {
        let mut fees = LabelMap::new();
        for text in scan_texts(driver, item, self.selectors.fees, FEES_PER_SELECTOR) {
            if !FEE_KEYWORDS.iter().any(|k| text.contains(k)) {
                continue;
            }
            if let Some(class) = classify_fee(&text) {
                fees.insert(class, text);
            }
        }
        fees
    }

    fn promotions<D: Driver>(&self, driver: &D, item: &D::Node) -> Vec<String> {
        let mut promotions: Vec<String> = Vec::new();
        for text in scan_texts(driver, item, self.selectors.promotions, PROMOTIONS_PER_SELECTOR) {
            if text.chars().count() <= 3 {
                continue;
            }
            if PROMOTION_KEYWORDS.iter().any(|k| text.contains(k)) && !promotions.contains(&text) {
                promotions.push(text);
            }
        }
        promotions
    }
}

fn classify_fee(text: &str) -> Option<&'static str> {
    if text.contains("手續費") {
        Some("手續費")
    } else if text.contains('折') {
        Some("優惠折扣")
    } else if text.contains('%') {
        Some("費率")
    } else {
        None
    }
}

/// Trimmed texts of the first `per_selector` matches of each selector, in
/// selector order. Failing selectors contribute nothing.
fn scan_texts<D: Driver>(
    driver: &D,
    item: &D::Node,
    selectors: &[&str],
    per_selector: usize,
) -> Vec<String> {
    let mut texts = Vec::new();
    for selector in selectors {
        let Ok(nodes) = driver.find_all(Scope::Within(item), selector) else {
            continue;
        };
        texts.extend(
            nodes
                .iter()
                .take(per_selector)
                .filter_map(|n| driver.text(n).ok())
                .map(|t| t.trim().to_string()),
        );
    }
    texts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::SnapshotDriver;

    const LISTING: &str = r#"
      <html><body>
        <div data-testid="product-card">
          <h3 data-testid="product-title">永豐金證券 大戶投</h3>
          <div data-testid="product-content">
            <div class="border-l"><p class="text-xs">電子下單</p><p class="font-bold">2.8折</p></div>
            <div class="border-l"><p class="text-xs">最低</p><p class="b1-bold">1元</p></div>
          </div>
          <div class="fee">手續費 2.8 折起</div>
          <div class="commission">定期定額 0.1%</div>
          <div class="cost">含稅</div>
          <div class="promotion">開戶送 200 元</div>
          <div class="offer">開戶送 200 元</div>
          <div class="deal">贈品</div>
          <div class="promo-box">限時免費開戶</div>
          <div data-testid="product-banner"><img src="https://cdn.roo.cash/sinopac.png" alt="永豐"></div>
        </div>
      </body></html>
    "#;

    fn record() -> AccountRecord {
        let driver = SnapshotDriver::new().with_page("https://roo.cash/securities", LISTING);
        driver.navigate("https://roo.cash/securities").unwrap();
        let card = driver
            .find_first(Scope::Page, "div[data-testid='product-card']")
            .unwrap();
        AccountExtractor::default().extract(&driver, &card, 1).unwrap()
    }

    #[test]
    fn test_broker_info_uses_value_fallbacks() {
        let record = record();
        assert_eq!(record.name, "永豐金證券 大戶投");
        assert_eq!(record.broker_info.get("電子下單"), Some("2.8折"));
        assert_eq!(record.broker_info.get("最低"), Some("1元"));
    }

    #[test]
    fn test_fees_are_classified_by_keyword() {
        let record = record();
        assert_eq!(record.fee_info.get("手續費"), Some("手續費 2.8 折起"));
        assert_eq!(record.fee_info.get("費率"), Some("定期定額 0.1%"));
        assert_eq!(record.fee_info.get("優惠折扣"), None);
    }

    #[test]
    fn test_promotions_are_filtered_and_deduplicated() {
        let record = record();
        assert_eq!(record.promotions, vec!["開戶送 200 元", "限時免費開戶"]);
        assert_eq!(record.buttons.open_account, "立即開戶");
        assert_eq!(record.banner.alt, "永豐");
    }

    #[test]
    fn test_classify_fee_precedence() {
        assert_eq!(classify_fee("手續費 6 折"), Some("手續費"));
        assert_eq!(classify_fee("6 折"), Some("優惠折扣"));
        assert_eq!(classify_fee("0.1%"), Some("費率"));
        assert_eq!(classify_fee("免費"), None);
    }
}
