use crate::driver::{Driver, Scope};
use crate::locator::{all_texts, first_attribute, first_present, first_text};
use crate::records::{Activity, CreditCardRecord, LabelMap};
use crate::selectors::{CreditCardSelectors, ListingSelectors, CREDIT_CARD};

use super::{ensure_attached, extract_countdown, ProductExtractor};

const REWARD_CAP: usize = 3;

pub struct CreditCardExtractor {
    selectors: &'static CreditCardSelectors,
}

impl Default for CreditCardExtractor {
    fn default() -> Self {
        Self {
            selectors: &CREDIT_CARD,
        }
    }
}

impl ProductExtractor for CreditCardExtractor {
    type Record = CreditCardRecord;
    const LABEL: &'static str = "credit card";

    fn listing(&self) -> &ListingSelectors {
        &self.selectors.listing
    }

    fn extract<D: Driver>(
        &self,
        driver: &D,
        item: &D::Node,
        index: usize,
    ) -> anyhow::Result<CreditCardRecord> {
        ensure_attached(driver, item)?;
        let s = self.selectors;
        let scope = Scope::Within(item);

        Ok(CreditCardRecord {
            name: first_text(driver, scope, s.name, &format!("未知信用卡 {index}")),
            tags: all_texts(driver, scope, s.tags),
            activity: Activity {
                name: first_text(driver, scope, s.activity, ""),
                countdown: extract_countdown(driver, item, s.countdown_digits),
            },
            gifts: self.gifts(driver, item),
            rewards: self.rewards(driver, item),
            apply_button: first_text(driver, scope, s.apply_button, "立即申請"),
            detail_link: first_attribute(driver, scope, s.detail_link, "href", ""),
        })
    }
}

impl CreditCardExtractor {
    /// Gift captions, or the gift images' alt texts when no caption renders.
    fn gifts<D: Driver>(&self, driver: &D, item: &D::Node) -> Vec<String> {
        let texts = all_texts(driver, Scope::Within(item), self.selectors.gift_texts);
        if !texts.is_empty() {
            return texts;
        }
        first_present(driver, Scope::Within(item), self.selectors.gift_images)
            .iter()
            .filter_map(|img| driver.attribute(img, "alt").ok().flatten())
            .filter(|alt| !alt.is_empty())
            .collect()
    }

    fn rewards<D: Driver>(&self, driver: &D, item: &D::Node) -> LabelMap {
        let s = self.selectors;
        let mut rewards = LabelMap::new();
        for block in first_present(driver, Scope::Within(item), s.reward_blocks)
            .iter()
            .take(REWARD_CAP)
        {
            let label = first_text(driver, Scope::Within(block), s.reward_label, "");
            let value = first_text(driver, Scope::Within(block), s.reward_value, "");
            if !label.is_empty() && !value.is_empty() {
                rewards.insert(label, value);
                continue;
            }
            if let Some((label, value)) = driver
                .text(block)
                .ok()
                .and_then(|text| split_label_value(&text))
            {
                rewards.insert(label, value);
            }
        }
        rewards
    }
}

/// Splits `"label: value"` or `"label：value"` at the first colon.
fn split_label_value(text: &str) -> Option<(String, String)> {
    let text = text.trim().replace('：', ":");
    let (label, value) = text.split_once(':')?;
    Some((label.trim().to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::SnapshotDriver;

    const LISTING: &str = r#"
      <html><body>
        <div class="product-card-large">
          <h3 data-testid="product-title">玉山 Pi 拍錢包信用卡</h3>
          <div data-testid="product-taxonomy"><div>現金回饋</div><div>網購</div></div>
          <div data-testid="product-activity">新戶首刷禮</div>
          <div class="flex items-center gap-1">
            <div class="b1-bold">3</div><div class="b1-bold">12</div>
            <div class="b1-bold">5</div><div class="b1-bold">40</div>
          </div>
          <div class="scrollbar-hidden"><img alt="行李箱"><img alt="氣炸鍋"></div>
          <div class="max-w-60 flex-1"><p class="c1-regular">國內一般</p><p class="b1-bold">1%</p></div>
          <div class="max-w-60 flex-1"><span>海外：3%</span></div>
          <div class="max-w-60 flex-1"><p class="c1-regular">保費</p><p class="b1-bold">0.5%</p></div>
          <div class="max-w-60 flex-1"><p class="c1-regular">第四</p><p class="b1-bold">9%</p></div>
          <a data-testid="product-detail" href="/credit-card/info/esun-pi">詳情</a>
        </div>
        <div class="product-card-large">
          <div class="flex items-center gap-1">
            <div class="b1-bold">3</div><div class="b1-bold">12</div>
          </div>
        </div>
      </body></html>
    "#;

    fn cards() -> (SnapshotDriver, Vec<<SnapshotDriver as Driver>::Node>) {
        let driver = SnapshotDriver::new().with_page("https://roo.cash/creditcard", LISTING);
        driver.navigate("https://roo.cash/creditcard").unwrap();
        let cards = driver
            .find_all(Scope::Page, "div.product-card-large")
            .unwrap();
        (driver, cards)
    }

    #[test]
    fn test_full_card() {
        let (d, cards) = cards();
        let record = CreditCardExtractor::default().extract(&d, &cards[0], 1).unwrap();

        assert_eq!(record.name, "玉山 Pi 拍錢包信用卡");
        assert_eq!(record.tags, vec!["現金回饋", "網購"]);
        assert_eq!(record.activity.name, "新戶首刷禮");
        assert_eq!(record.activity.countdown, "3 天 12 時 5 分 40 秒");
        assert_eq!(record.gifts, vec!["行李箱", "氣炸鍋"]);
        assert_eq!(record.rewards.get("國內一般"), Some("1%"));
        assert_eq!(record.rewards.get("海外"), Some("3%"));
        assert_eq!(record.rewards.get("保費"), Some("0.5%"));
        assert_eq!(record.rewards.get("第四"), None);
        assert_eq!(record.apply_button, "立即申請");
        assert_eq!(record.detail_link, "https://roo.cash/credit-card/info/esun-pi");
    }

    #[test]
    fn test_sparse_card_uses_defaults() {
        let (d, cards) = cards();
        let record = CreditCardExtractor::default().extract(&d, &cards[1], 2).unwrap();

        assert_eq!(record.name, "未知信用卡 2");
        assert!(record.tags.is_empty());
        assert_eq!(record.activity.countdown, "");
        assert!(record.rewards.is_empty());
        assert_eq!(record.detail_link, "");
    }

    #[test]
    fn test_blank_detail_anchor_falls_through_to_info_link() {
        let page = r#"<html><body><div class="product-card-large">
            <h3 data-testid="product-title">卡</h3>
            <a data-testid="product-detail" href="">詳情</a>
            <a href="/credit-card/info/real">看更多</a>
          </div></body></html>"#;
        let d = SnapshotDriver::new().with_page("https://roo.cash/creditcard", page);
        d.navigate("https://roo.cash/creditcard").unwrap();
        let card = d.find_first(Scope::Page, "div.product-card-large").unwrap();

        let record = CreditCardExtractor::default().extract(&d, &card, 1).unwrap();
        assert_eq!(record.detail_link, "https://roo.cash/credit-card/info/real");
    }

    #[test]
    fn test_stale_card_fails_whole_record() {
        let (d, cards) = cards();
        d.navigate("https://roo.cash/creditcard").unwrap();
        assert!(CreditCardExtractor::default().extract(&d, &cards[0], 1).is_err());
    }

    #[test]
    fn test_split_label_value_accepts_fullwidth_colon() {
        assert_eq!(
            split_label_value(" 海外：3% "),
            Some(("海外".to_string(), "3%".to_string()))
        );
        assert_eq!(split_label_value("no colon"), None);
    }
}
