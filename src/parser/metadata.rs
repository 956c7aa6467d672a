//! Per-source extraction of page-level metadata: the puzzle's name, its print
//! date, and a link to the publisher's own copy.
//!
//! Each concern has a registry keyed by a URL fragment; the first strategy
//! whose fragment appears in the source URL and whose extractor succeeds wins.
//! Failures just fall through, so overlapping fragments can act as fallbacks.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};

use super::dom;
use super::util::slug_to_title;

pub struct MetadataStrategy {
    pub url_fragment: &'static str,
    pub extract: fn(&str, &Html) -> Option<String>,
}

/// First strategy whose fragment is in `source_url` and whose extractor
/// returns something non-empty.
pub fn resolve(
    registry: &[MetadataStrategy],
    source_url: &str,
    html: &Html,
) -> Option<String> {
    registry
        .iter()
        .filter(|strategy| source_url.contains(strategy.url_fragment))
        .find_map(|strategy| {
            (strategy.extract)(source_url, html)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// The blog sources this pipeline understands, by URL fragment.
pub const SOURCES: &[&str] = &[
    "bigdave44",
    "fifteensquared",
    "natpostcryptic",
    "thehinducrosswordcorner",
    "times-xwd-times",
];

pub fn source_of(url: &str) -> Option<&'static str> {
    SOURCES.iter().find(|fragment| url.contains(*fragment)).copied()
}

// ── puzzle names ────────────────────────────────────────────────────────────

static LEADING_NAME_AND_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z ]*[-—–:\s]*[0-9,]+").unwrap());
static LEADING_NAME_NUMBER_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z ]*[0-9,]+").unwrap());

pub static PUZZLE_NAMES: &[MetadataStrategy] = &[
    MetadataStrategy {
        url_fragment: "bigdave44",
        extract: |_, html| {
            let title = dom::title_text(html)?;
            let name = LEADING_NAME_AND_NUMBER.find(&title)?.as_str();
            Some(
                name.replace("DT", "Daily Telegraph")
                    .replace("ST", "Sunday Telegraph"),
            )
        },
    },
    MetadataStrategy {
        url_fragment: "fifteensquared",
        extract: |source_url, _| {
            let slug = source_url.split('/').filter(|s| !s.is_empty()).last()?;
            Some(slug_to_title(slug))
        },
    },
    MetadataStrategy {
        url_fragment: "natpostcryptic",
        extract: |_, html| {
            let title = dom::title_text(html)?;
            Some(title.replace("National Post Cryptic Crossword Forum: ", ""))
        },
    },
    MetadataStrategy {
        url_fragment: "thehinducrosswordcorner",
        extract: |_, html| {
            let title = dom::title_text(html)?;
            Some(title.replace("THE HINDU CROSSWORD CORNER: ", ""))
        },
    },
    MetadataStrategy {
        url_fragment: "times-xwd-times",
        extract: |_, html| {
            let title = dom::title_text(html)?;
            Some(LEADING_NAME_NUMBER_ONLY.find(&title)?.as_str().to_string())
        },
    },
];

// ── puzzle dates ────────────────────────────────────────────────────────────

static DATE_IN_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}/\d{2}/\d{2}").unwrap());
static ORDINAL_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)(?:st|nd|rd|th)").unwrap());

static DATE_HEADER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2.date-header").unwrap());
static ASSET_ENTRY_DATE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.asset-meta.asset-entry-date").unwrap());

fn date_from_url(source_url: &str, _: &Html) -> Option<String> {
    Some(DATE_IN_URL.find(source_url)?.as_str().replace('/', "-"))
}

/// Best-effort parse of the handful of long-form date spellings the blogs
/// use, normalized to ISO. Ordinal suffixes ("12th") are stripped first.
pub fn parse_blog_date(text: &str) -> Option<String> {
    let normalized = ORDINAL_SUFFIX.replace_all(text.trim(), "$1");
    let normalized = normalized.trim();
    const FORMATS: &[&str] = &[
        "%A, %B %d, %Y",
        "%A, %d %B %Y",
        "%B %d, %Y",
        "%d %B %Y",
        "%Y-%m-%d",
    ];
    FORMATS.iter().find_map(|format| {
        NaiveDate::parse_from_str(normalized, format)
            .ok()
            .map(|date| date.format("%Y-%m-%d").to_string())
    })
}

fn date_from_selector(html: &Html, sel: &Selector) -> Option<String> {
    let el = html.select(sel).next()?;
    parse_blog_date(&dom::element_text(el))
}

pub static PUZZLE_DATES: &[MetadataStrategy] = &[
    MetadataStrategy { url_fragment: "bigdave44", extract: date_from_url },
    MetadataStrategy { url_fragment: "fifteensquared", extract: date_from_url },
    MetadataStrategy {
        url_fragment: "natpostcryptic",
        extract: |_, html| date_from_selector(html, &DATE_HEADER),
    },
    MetadataStrategy {
        url_fragment: "thehinducrosswordcorner",
        extract: |_, html| date_from_selector(html, &DATE_HEADER),
    },
    MetadataStrategy {
        url_fragment: "times-xwd-times",
        extract: |_, html| date_from_selector(html, &ASSET_ENTRY_DATE),
    },
];

// ── publisher links ─────────────────────────────────────────────────────────

static BIGDAVE44_PUZZLE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://puzzles\.telegraph\.co\.uk/.+|^https?://www\.telegraph\.co\.uk/puzzles/.+",
    )
    .unwrap()
});
static FIFTEENSQUARED_PUZZLE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://www\.theguardian\.com/crosswords/.+|^https?://puzzles\.independent\.co\.uk/games/cryptic-crossword-independent/.+|^https?://www\.ft\.com/content/.+",
    )
    .unwrap()
});
static TIMES_PUZZLE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://www\.thetimes\.co\.uk/puzzles/.+").unwrap());

pub static PUZZLE_URLS: &[MetadataStrategy] = &[
    MetadataStrategy {
        url_fragment: "bigdave44",
        extract: |_, html| dom::first_href_matching(html, &BIGDAVE44_PUZZLE_URL),
    },
    MetadataStrategy {
        url_fragment: "fifteensquared",
        extract: |_, html| dom::first_href_matching(html, &FIFTEENSQUARED_PUZZLE_URL),
    },
    MetadataStrategy {
        url_fragment: "times-xwd-times",
        extract: |_, html| dom::first_href_matching(html, &TIMES_PUZZLE_URL),
    },
];
