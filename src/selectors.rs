//! Selector candidate tables for every page template on roo.cash.
//!
//! Each list is ordered most specific first: `data-testid` hooks, then the
//! utility-class fallbacks the site rendered before it had test ids.

/// How to find the cards on a listing page.
#[derive(Debug, Clone, Copy)]
pub struct ListingSelectors {
    /// Waited for before collecting cards.
    pub ready: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
}

pub struct CreditCardSelectors {
    pub listing: ListingSelectors,
    pub name: &'static [&'static str],
    pub tags: &'static [&'static str],
    pub activity: &'static [&'static str],
    pub countdown_digits: &'static str,
    pub gift_texts: &'static [&'static str],
    pub gift_images: &'static [&'static str],
    pub reward_blocks: &'static [&'static str],
    pub reward_label: &'static [&'static str],
    pub reward_value: &'static [&'static str],
    pub apply_button: &'static [&'static str],
    pub detail_link: &'static [&'static str],
}

pub const CREDIT_CARD: CreditCardSelectors = CreditCardSelectors {
    listing: ListingSelectors {
        ready: "div.product-card-large, div[data-testid='product-card']",
        primary: "div.product-card-large",
        secondary: "div[data-testid='product-card']",
    },
    name: &["h3[data-testid='product-title']", "h3"],
    tags: &[
        "div[data-testid='product-taxonomy'] div",
        ".whitespace-nowrap.rounded-full",
    ],
    activity: &[
        "div[data-testid='product-activity']",
        ".flex.flex-col.items-start.justify-between",
    ],
    countdown_digits: ".flex.items-center.gap-1 div.b1-bold",
    gift_texts: &[
        r".flex.min-w-\[86px\] p.c1-regular",
        r".scrollbar-hidden .flex.min-w-\[86px\] p",
    ],
    gift_images: &[".scrollbar-hidden img"],
    reward_blocks: &[".max-w-60.flex-1"],
    reward_label: &["p.c1-regular"],
    reward_value: &["p.b1-bold"],
    apply_button: &["div[data-testid='product-cta']", ".bg-NRooOrange-120"],
    detail_link: &[
        "a[data-testid='product-detail']",
        "a[href*='credit-card/info']",
    ],
};

pub struct LoanSelectors {
    pub listing: ListingSelectors,
    pub name: &'static [&'static str],
    pub info_blocks: &'static [&'static str],
    pub info_label: &'static [&'static str],
    pub info_value: &'static [&'static str],
    pub highlights: &'static [&'static str],
    pub activity: &'static [&'static str],
    pub tags: &'static [&'static str],
    pub banner: &'static [&'static str],
    pub apply_button: &'static [&'static str],
    pub detail_link: &'static [&'static str],
}

pub const PERSONAL_LOAN: LoanSelectors = LoanSelectors {
    listing: ListingSelectors {
        ready: "div[data-testid='product-card']",
        primary: "div[data-testid='product-card']",
        secondary: "div.product-card-large",
    },
    name: &["h3[data-testid='product-title']", "h3"],
    info_blocks: &["div[data-testid='product-content'] > div.border-l"],
    info_label: &["p.text-xs"],
    info_value: &["p.font-bold"],
    highlights: &["div[data-testid^='product-highlight-']"],
    activity: &["div[data-testid='product-activity']"],
    tags: &["div[data-testid='product-taxonomy'] div.whitespace-nowrap.rounded-full"],
    banner: &["div[data-testid='product-banner'] img"],
    apply_button: &["div[data-testid='product-apply-cta']"],
    detail_link: &["a[data-testid='product-detail']"],
};

pub struct AccountSelectors {
    pub listing: ListingSelectors,
    pub name: &'static [&'static str],
    pub broker_blocks: &'static [&'static str],
    pub broker_label: &'static [&'static str],
    pub broker_value: &'static [&'static str],
    pub highlights: &'static [&'static str],
    pub activity: &'static [&'static str],
    pub tags: &'static [&'static str],
    pub fees: &'static [&'static str],
    pub promotions: &'static [&'static str],
    pub banner: &'static [&'static str],
    pub apply_button: &'static [&'static str],
    pub detail_link: &'static [&'static str],
}

pub const SECURITIES_ACCOUNT: AccountSelectors = AccountSelectors {
    listing: ListingSelectors {
        ready: "div[data-testid='product-card'], div.product-card-large",
        primary: "div[data-testid='product-card']",
        secondary: "div.product-card-large",
    },
    name: &["h3[data-testid='product-title']", "h3", ".font-bold"],
    broker_blocks: &[
        "div[data-testid='product-content'] > div.border-l",
        ".border-l",
    ],
    broker_label: &["p.text-xs", ".label", ".info-label"],
    broker_value: &["p.font-bold", ".value", ".info-value", "p.b1-bold"],
    highlights: &["div[data-testid^='product-highlight-']", ".highlight"],
    activity: &["div[data-testid='product-activity']", ".activity-info"],
    tags: &[
        "div[data-testid='product-taxonomy'] div.whitespace-nowrap.rounded-full",
        ".tag",
    ],
    // Scanned cumulatively, not first-match: each one can contribute.
    fees: &[
        ".fee",
        ".commission",
        ".cost",
        "[class*='fee']",
        "[class*='commission']",
    ],
    promotions: &[
        ".promotion",
        ".offer",
        ".deal",
        "[class*='promo']",
        "[class*='offer']",
    ],
    banner: &["div[data-testid='product-banner'] img", ".banner img"],
    apply_button: &["div[data-testid='product-apply-cta']", ".apply-btn"],
    detail_link: &["a[data-testid='product-detail']", "a[href*='securities']"],
};

/// Blog category listing and article pages.
pub struct ArticleSelectors {
    pub listing: ListingSelectors,
    /// Title link inside a listing card.
    pub card_title_link: &'static str,
    pub numbered_page_links: &'static str,
    pub next_page_link: &'static str,
    pub article_container: &'static [&'static str],
    pub content_container: &'static [&'static str],
    pub publish_date: &'static str,
    pub categories: &'static [&'static str],
    pub image: &'static [&'static str],
    pub paragraphs: &'static [&'static str],
    pub headings: &'static [&'static str],
    pub list_items: &'static [&'static str],
    pub tables: &'static [&'static str],
    pub table_rows: &'static str,
    pub table_cells: &'static str,
}

pub const ARTICLE: ArticleSelectors = ArticleSelectors {
    listing: ListingSelectors {
        ready: "div.elementor-post__card, h2.elementor-heading-title a",
        primary: "div.elementor-post__card",
        secondary: "h2.elementor-heading-title a",
    },
    card_title_link: "h3.elementor-post__title a, h2.elementor-heading-title a",
    numbered_page_links: "a.page-numbers:not(.next):not(.prev)",
    next_page_link: "a.page-numbers.next",
    article_container: &["article.bam-single-post, article.post"],
    content_container: &["div.entry-content, div.elementor-widget-theme-post-content"],
    publish_date: "span.elementor-post-info__item--type-date, time.entry-date, meta[property='article:published_time']",
    categories: &["span.elementor-post-info__terms-list a, span.cat-links a, div.category-list a"],
    image: &["div.elementor-featured-image img, div.post-thumbnail img, img.wp-post-image"],
    paragraphs: &["div.entry-content p, div.elementor-widget-theme-post-content p"],
    headings: &["div.entry-content h1, div.entry-content h2, div.entry-content h3, \
                 div.entry-content h4, div.entry-content h5, div.entry-content h6, \
                 div.elementor-widget-theme-post-content h1, div.elementor-widget-theme-post-content h2, \
                 div.elementor-widget-theme-post-content h3, div.elementor-widget-theme-post-content h4, \
                 div.elementor-widget-theme-post-content h5, div.elementor-widget-theme-post-content h6"],
    list_items: &["div.entry-content li, div.elementor-widget-theme-post-content li"],
    tables: &["div.entry-content table, div.elementor-widget-theme-post-content table"],
    table_rows: "tr",
    table_cells: "td, th",
};
