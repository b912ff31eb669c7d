// src/estimators/content.rs
//! Publication date extraction from an article page.
//! Order: meta tags → date containers → visible text.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::patterns::{date_from_text, parse_structured, TextFamily};

/// Visible text beyond this many characters is not scanned.
pub const MAX_SCAN_CHARS: usize = 20_000;

#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeSource {
    MetaTag(&'static str),
    Container(&'static str),
    Text(TextFamily),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScrapedDate {
    pub date: DateTime<Utc>,
    pub source: ScrapeSource,
}

impl ScrapedDate {
    pub fn weight(&self) -> f32 {
        match &self.source {
            ScrapeSource::MetaTag(_) => 1.0,
            ScrapeSource::Container(_) => 0.9,
            ScrapeSource::Text(f) if f.is_relative() => 0.6,
            ScrapeSource::Text(_) => 0.75,
        }
    }

    pub fn describe(&self) -> String {
        match &self.source {
            ScrapeSource::MetaTag(sel) => format!("meta {sel}"),
            ScrapeSource::Container(sel) => format!("element {sel}"),
            ScrapeSource::Text(f) => format!("page text {}", f.as_str()),
        }
    }
}

fn compile(list: &[&'static str]) -> Vec<(&'static str, Selector)> {
    list.iter()
        .filter_map(|s| Selector::parse(s).ok().map(|sel| (*s, sel)))
        .collect()
}

static META: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| {
    compile(&[
        r#"meta[property="article:published_time"]"#,
        r#"meta[name="article:published_time"]"#,
        r#"meta[itemprop="datePublished"]"#,
        r#"meta[name="pubdate"]"#,
        r#"meta[name="publishdate"]"#,
        r#"meta[name="date"]"#,
        r#"meta[property="og:published_time"]"#,
        r#"meta[property="og:updated_time"]"#,
        r#"meta[property="article:modified_time"]"#,
    ])
});

static CONTAINERS: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| {
    compile(&[
        "time[datetime]",
        r#"[itemprop="datePublished"]"#,
        ".article-date",
        ".published",
        ".pubdate",
        ".news-date",
        ".view_date",
        ".info_date",
        ".byline time",
        ".timestamp",
        ".date",
    ])
});

static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("static selector"));

static NOISE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style|noscript)[^>]*>.*?</(script|style|noscript)>")
        .expect("static regex")
});
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]+>").expect("static regex"));
static WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ")
}

/// Find the most authoritative publication date on the page.
pub fn scrape_published_date(
    html: &str,
    utc_offset_hours: i32,
    now: DateTime<Utc>,
) -> Option<ScrapedDate> {
    let doc = Html::parse_document(html);

    for (name, sel) in META.iter() {
        for el in doc.select(sel) {
            let Some(content) = el.value().attr("content") else {
                continue;
            };
            if let Some(date) = parse_structured(content, utc_offset_hours, now) {
                return Some(ScrapedDate {
                    date,
                    source: ScrapeSource::MetaTag(*name),
                });
            }
        }
    }

    for (name, sel) in CONTAINERS.iter() {
        for el in doc.select(sel) {
            let attr = el
                .value()
                .attr("datetime")
                .or_else(|| el.value().attr("content"));
            let found = attr
                .and_then(|raw| parse_structured(raw, utc_offset_hours, now))
                .or_else(|| parse_structured(&element_text(el), utc_offset_hours, now));
            if let Some(date) = found {
                return Some(ScrapedDate {
                    date,
                    source: ScrapeSource::Container(*name),
                });
            }
        }
    }

    let text = match doc.select(&BODY).next() {
        Some(body) => visible_text(&body.html()),
        None => visible_text(html),
    };
    date_from_text(&text, utc_offset_hours, now).map(|t| ScrapedDate {
        date: t.date,
        source: ScrapeSource::Text(t.family),
    })
}

/// Strip scripts and markup, decode entities, collapse whitespace, truncate.
pub fn visible_text(html: &str) -> String {
    let no_noise = NOISE.replace_all(html, " ");
    let no_tags = TAG.replace_all(&no_noise, " ");
    let decoded = html_escape::decode_html_entities(&no_tags);
    let collapsed = WS.replace_all(decoded.trim(), " ");
    collapsed.chars().take(MAX_SCAN_CHARS).collect()
}
