mod common;

use common::{read_csv, read_json, settings, FlakyDriver, TIMESTAMP};
use roocash_crawler::crawler::{Crawler, Kind};
use roocash_crawler::driver::SnapshotDriver;
use roocash_crawler::storage::StorageManager;

const CREDIT_CARD_URL: &str = "https://roo.cash/creditcard";
const LOAN_URL: &str = "https://roo.cash/personal-loan";

fn credit_card(n: usize, countdown_digits: usize) -> String {
    let digits: String = (0..countdown_digits)
        .map(|d| format!(r#"<div class="b1-bold">{d}</div>"#))
        .collect();
    format!(
        r#"<div class="product-card-large">
             <h3 data-testid="product-title">卡 {n}</h3>
             <div data-testid="product-taxonomy"><div>現金回饋</div></div>
             <div data-testid="product-activity">首刷禮 {n}</div>
             <div class="flex items-center gap-1">{digits}</div>
             <a data-testid="product-detail" href="/credit-card/info/{n}">詳情</a>
           </div>"#
    )
}

fn credit_card_page() -> String {
    let mut cards = String::new();
    for n in 1..=7 {
        let digits = if n == 2 { 2 } else { 4 };
        cards.push_str(&credit_card(n, digits));
    }
    cards = cards.replace("卡 4", "卡 4 BROKEN");
    format!("<html><head><title>信用卡</title></head><body>{cards}</body></html>")
}

#[tokio::test(start_paused = true)]
async fn test_credit_card_run_isolates_failed_items_and_checkpoints() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let storage = StorageManager::new(dir.path()).unwrap();
    let driver = FlakyDriver::new(
        SnapshotDriver::new().with_page(CREDIT_CARD_URL, credit_card_page()),
    )
    .poison("BROKEN");

    let summary = Crawler::new(&driver, &storage, &settings)
        .with_timestamp(TIMESTAMP)
        .run(Kind::CreditCard)
        .await
        .unwrap();

    assert_eq!(summary.found, 7);
    assert_eq!(summary.extracted, 6);
    assert_eq!(summary.failed, 1);

    let json = read_json(&dir.path().join("roocash_credit_cards_20240101_000000.json"));
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["卡片名稱"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["卡 1", "卡 2", "卡 3", "卡 5", "卡 6", "卡 7"]);
    assert_eq!(json[0]["首刷活動"]["活動倒數"], "0 天 1 時 2 分 3 秒");
    assert_eq!(json[0]["詳細頁連結"], "https://roo.cash/credit-card/info/1");

    // The temp checkpoint ends up with everything that was extracted.
    let temp = read_csv(&dir.path().join("roocash_credit_cards_temp.csv"));
    assert_eq!(temp.len(), 1 + 6);
}

#[tokio::test(start_paused = true)]
async fn test_partial_countdown_flattens_to_empty_column() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let storage = StorageManager::new(dir.path()).unwrap();
    let driver = SnapshotDriver::new().with_page(CREDIT_CARD_URL, credit_card_page());

    Crawler::new(&driver, &storage, &settings)
        .with_timestamp(TIMESTAMP)
        .run(Kind::CreditCard)
        .await
        .unwrap();

    let rows = read_csv(&dir.path().join("roocash_credit_cards_20240101_000000.csv"));
    let header = &rows[0];
    let countdown = header.iter().position(|c| c == "活動倒數").unwrap();
    let name = header.iter().position(|c| c == "卡片名稱").unwrap();

    let card_two = rows.iter().find(|r| r[name] == "卡 2").unwrap();
    assert_eq!(card_two[countdown], "");
    let card_one = rows.iter().find(|r| r[name] == "卡 1").unwrap();
    assert_eq!(card_one[countdown], "0 天 1 時 2 分 3 秒");
    // Every row has every column.
    assert!(rows.iter().all(|r| r.len() == header.len()));
}

#[tokio::test(start_paused = true)]
async fn test_stale_primary_selector_falls_back_to_secondary() {
    let cards: String = (1..=3)
        .map(|n| {
            format!(
                r#"<div data-testid="product-card" class="product-card-large">
                     <h3 data-testid="product-title">貸款 {n}</h3>
                     <div data-testid="product-content">
                       <div class="border-l"><p class="text-xs">年利率</p><p class="font-bold">{n}%</p></div>
                     </div>
                   </div>"#
            )
        })
        .collect();
    let page = format!("<html><head><title>信貸</title></head><body>{cards}</body></html>");

    let dir = tempfile::tempdir().unwrap();
    let settings = settings(dir.path());
    let storage = StorageManager::new(dir.path()).unwrap();
    let driver = FlakyDriver::new(SnapshotDriver::new().with_page(LOAN_URL, page))
        .stale("div[data-testid='product-card']");

    let summary = Crawler::new(&driver, &storage, &settings)
        .with_timestamp(TIMESTAMP)
        .run(Kind::PersonalLoan)
        .await
        .unwrap();

    assert_eq!(summary.found, 3);
    assert_eq!(summary.extracted, 3);
    let json = read_json(&dir.path().join("roocash_personal_loans_20240101_000000.json"));
    assert_eq!(json[2]["貸款名稱"], "貸款 3");
    assert_eq!(json[2]["貸款資訊"]["年利率"], "3%");
    assert_eq!(json[2]["操作按鈕"]["申請按鈕"], "立即申請");
}
