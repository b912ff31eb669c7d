//! # Pattern Library
//!
//! Stateless date patterns used across the estimators:
//! - URL families (dated permalinks, compact stamps, Korean article ids, epoch suffixes).
//! - Text families for content scans (ISO-8601, Korean, English long-form, relative phrases).
//!
//! Every candidate goes through [`is_plausible`] before it is returned.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

/// Nothing published before this year is accepted.
pub const EPOCH_FLOOR_YEAR: i32 = 2000;

/// Returns `true` when `date` is not before the epoch floor and at most one day ahead of `now`.
pub fn is_plausible(date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let floor = Utc
        .with_ymd_and_hms(EPOCH_FLOOR_YEAR, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    date >= floor && date <= now + Duration::days(1)
}

/// Interpret a wall-clock value in a source-local offset and convert to UTC.
pub fn local_to_utc(naive: NaiveDateTime, utc_offset_hours: i32) -> Option<DateTime<Utc>> {
    let offset = FixedOffset::east_opt(utc_offset_hours.clamp(-23, 23) * 3600)?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn ymd_hm(y: i32, m: u32, d: u32, hh: u32, mm: u32, utc_offset_hours: i32) -> Option<DateTime<Utc>> {
    let naive = NaiveDate::from_ymd_opt(y, m, d)?.and_hms_opt(hh, mm, 0)?;
    local_to_utc(naive, utc_offset_hours)
}

fn cap_num<T: std::str::FromStr>(caps: &Captures, name: &str) -> Option<T> {
    caps.name(name)?.as_str().parse().ok()
}

/* ----------------------------
URL families
---------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrlFamily {
    /// `/articles/2025-08-25/slug`, `slug-2025-08-25/`
    DashedYmd,
    /// `/2025/08/25/slug`
    SlashedYmd,
    /// `/article/202508251430...` (date plus hour/minute)
    CompactStamp,
    /// `/20250825/` or `-20250825.`
    CompactYmd,
    /// `?idxno=20250825xxxx`
    IdxnoYmd,
    /// `/view/AKR20250825012300...`
    AkrYmd,
    /// 10-digit seconds (optionally 13-digit millis) path or query segment
    UnixEpoch,
    /// 8 lowercase hex digits encoding epoch seconds
    HexEpoch,
}

impl UrlFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlFamily::DashedYmd => "dashed_ymd",
            UrlFamily::SlashedYmd => "slashed_ymd",
            UrlFamily::CompactStamp => "compact_stamp",
            UrlFamily::CompactYmd => "compact_ymd",
            UrlFamily::IdxnoYmd => "idxno_ymd",
            UrlFamily::AkrYmd => "akr_ymd",
            UrlFamily::UnixEpoch => "unix_epoch",
            UrlFamily::HexEpoch => "hex_epoch",
        }
    }

    fn regex(&self) -> &'static Regex {
        static DASHED: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?:^|[/_-])(?P<y>20\d{2})-(?P<m>\d{1,2})-(?P<d>\d{1,2})(?:[/_.?#-]|$)")
                .expect("dashed ymd regex")
        });
        static SLASHED: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"/(?P<y>20\d{2})/(?P<m>\d{1,2})/(?P<d>\d{1,2})(?:[/.?#]|$)")
                .expect("slashed ymd regex")
        });
        static STAMP: Lazy<Regex> = Lazy::new(|| {
            Regex::new(
                r"[/=](?P<y>20\d{2})(?P<m>0[1-9]|1[0-2])(?P<d>0[1-9]|[12]\d|3[01])(?P<hh>[01]\d|2[0-3])(?P<mm>[0-5]\d)",
            )
            .expect("compact stamp regex")
        });
        static COMPACT: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?:^|[/_=-])(?P<y>20\d{2})(?P<m>\d{2})(?P<d>\d{2})(?:[/_.?&#-]|$)")
                .expect("compact ymd regex")
        });
        static IDXNO: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)[?&]idxno=(?P<y>20\d{2})(?P<m>\d{2})(?P<d>\d{2})\d*")
                .expect("idxno regex")
        });
        static AKR: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"/AKR(?P<y>20\d{2})(?P<m>\d{2})(?P<d>\d{2})\d*").expect("akr regex")
        });
        static EPOCH: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?:^|[/=_-])(?P<secs>1[5-9]\d{8})(?P<ms>\d{3})?(?:[/_.?&#-]|$)")
                .expect("unix epoch regex")
        });
        static HEX: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"[/_-](?P<hex>[56][0-9a-f]{7})(?:[/?.#]|$)").expect("hex epoch regex")
        });
        match self {
            UrlFamily::DashedYmd => &*DASHED,
            UrlFamily::SlashedYmd => &*SLASHED,
            UrlFamily::CompactStamp => &*STAMP,
            UrlFamily::CompactYmd => &*COMPACT,
            UrlFamily::IdxnoYmd => &*IDXNO,
            UrlFamily::AkrYmd => &*AKR,
            UrlFamily::UnixEpoch => &*EPOCH,
            UrlFamily::HexEpoch => &*HEX,
        }
    }

    fn parse(&self, caps: &Captures, utc_offset_hours: i32) -> Option<DateTime<Utc>> {
        match self {
            UrlFamily::UnixEpoch => {
                let secs: i64 = cap_num(caps, "secs")?;
                DateTime::<Utc>::from_timestamp(secs, 0)
            }
            UrlFamily::HexEpoch => {
                let secs = i64::from_str_radix(caps.name("hex")?.as_str(), 16).ok()?;
                DateTime::<Utc>::from_timestamp(secs, 0)
            }
            UrlFamily::CompactStamp => ymd_hm(
                cap_num(caps, "y")?,
                cap_num(caps, "m")?,
                cap_num(caps, "d")?,
                cap_num(caps, "hh")?,
                cap_num(caps, "mm")?,
                utc_offset_hours,
            ),
            _ => ymd_hm(
                cap_num(caps, "y")?,
                cap_num(caps, "m")?,
                cap_num(caps, "d")?,
                0,
                0,
                utc_offset_hours,
            ),
        }
    }
}

/// One entry of an estimator's ordered URL pattern set.
#[derive(Debug, Clone, Copy)]
pub struct UrlPattern {
    pub family: UrlFamily,
    /// Multiplier applied on top of the estimator's URL base confidence.
    pub weight: f32,
}

impl UrlPattern {
    pub const fn new(family: UrlFamily, weight: f32) -> Self {
        Self { family, weight }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UrlDate {
    pub date: DateTime<Utc>,
    pub family: UrlFamily,
    pub weight: f32,
}

/// Try the patterns in order; the first plausible match wins.
pub fn date_from_url(
    url: &str,
    patterns: &[UrlPattern],
    utc_offset_hours: i32,
    now: DateTime<Utc>,
) -> Option<UrlDate> {
    let target = strip_scheme_and_host(url);
    for p in patterns {
        for caps in p.family.regex().captures_iter(target) {
            if let Some(date) = p.family.parse(&caps, utc_offset_hours) {
                if is_plausible(date, now) {
                    return Some(UrlDate {
                        date,
                        family: p.family,
                        weight: p.weight,
                    });
                }
            }
        }
    }
    None
}

/// Host names never carry dates; keep path + query only.
fn strip_scheme_and_host(url: &str) -> &str {
    match url.split_once("://") {
        Some((_, rest)) => rest
            .find(|c: char| c == '/' || c == '?')
            .map(|i| &rest[i..])
            .unwrap_or(""),
        None => url,
    }
}

/* ----------------------------
Text families
---------------------------- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextFamily {
    /// `작성일: 2025-08-25 14:30`, `입력 2025.08.25`
    KoreanLabeled,
    IsoDateTime,
    IsoDate,
    /// `2025년 8월 25일`
    KoreanLong,
    /// `2025.08.25`
    DottedYmd,
    /// `August 25, 2025`
    EnglishMonthDay,
    /// `25 August 2025`
    EnglishDayMonth,
    /// `3 hours ago`
    RelativeEnglish,
    /// `3시간 전`
    RelativeKorean,
}

impl TextFamily {
    pub const ALL: [TextFamily; 9] = [
        TextFamily::KoreanLabeled,
        TextFamily::IsoDateTime,
        TextFamily::IsoDate,
        TextFamily::KoreanLong,
        TextFamily::DottedYmd,
        TextFamily::EnglishMonthDay,
        TextFamily::EnglishDayMonth,
        TextFamily::RelativeEnglish,
        TextFamily::RelativeKorean,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TextFamily::KoreanLabeled => "korean_labeled",
            TextFamily::IsoDateTime => "iso_datetime",
            TextFamily::IsoDate => "iso_date",
            TextFamily::KoreanLong => "korean_long",
            TextFamily::DottedYmd => "dotted_ymd",
            TextFamily::EnglishMonthDay => "english_month_day",
            TextFamily::EnglishDayMonth => "english_day_month",
            TextFamily::RelativeEnglish => "relative_english",
            TextFamily::RelativeKorean => "relative_korean",
        }
    }

    /// Relative phrases are anchored on the fetch time, so they are trusted less.
    pub fn is_relative(&self) -> bool {
        matches!(self, TextFamily::RelativeEnglish | TextFamily::RelativeKorean)
    }

    fn regex(&self) -> &'static Regex {
        const MONTHS: &str = r"jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?";

        static KOREAN_LABELED: Lazy<Regex> = Lazy::new(|| {
            Regex::new(
                r"(?:작성일|입력|등록일|기사입력|승인|발행일)\s*[:：]?\s*(?P<y>\d{4})[-./](?P<m>\d{1,2})[-./](?P<d>\d{1,2})\.?(?:\s+(?P<hh>\d{1,2}):(?P<mm>\d{2}))?",
            )
            .expect("korean labeled regex")
        });
        static ISO_DATETIME: Lazy<Regex> = Lazy::new(|| {
            Regex::new(
                r"(?P<y>\d{4})-(?P<m>\d{2})-(?P<d>\d{2})[T ](?P<hh>\d{2}):(?P<mm>\d{2})(?::(?P<ss>\d{2})(?:\.\d+)?)?(?P<tz>Z|[+-]\d{2}:?\d{2})?",
            )
            .expect("iso datetime regex")
        });
        static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?:^|[^\d])(?P<y>\d{4})-(?P<m>\d{2})-(?P<d>\d{2})(?:[^\d]|$)")
                .expect("iso date regex")
        });
        static KOREAN_LONG: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?P<y>\d{4})년\s*(?P<m>\d{1,2})월\s*(?P<d>\d{1,2})일")
                .expect("korean long regex")
        });
        static DOTTED: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?:^|[^\d.])(?P<y>\d{4})\.(?P<m>\d{1,2})\.(?P<d>\d{1,2})(?:[^\d]|$)")
                .expect("dotted ymd regex")
        });
        static EN_MD: Lazy<Regex> = Lazy::new(|| {
            Regex::new(&format!(
                r"(?i)\b(?P<mon>{MONTHS})\.?\s+(?P<d>\d{{1,2}})(?:st|nd|rd|th)?,?\s+(?P<y>\d{{4}})\b"
            ))
            .expect("english month-day regex")
        });
        static EN_DM: Lazy<Regex> = Lazy::new(|| {
            Regex::new(&format!(
                r"(?i)\b(?P<d>\d{{1,2}})(?:st|nd|rd|th)?\s+(?P<mon>{MONTHS})\.?,?\s+(?P<y>\d{{4}})\b"
            ))
            .expect("english day-month regex")
        });
        static REL_EN: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?i)\b(?P<n>\d{1,3})\s*(?P<unit>minutes?|mins?|hours?|hrs?|days?)\s+ago\b")
                .expect("relative english regex")
        });
        static REL_KO: Lazy<Regex> = Lazy::new(|| {
            Regex::new(r"(?P<n>\d{1,3})\s*(?P<unit>분|시간|일)\s*전").expect("relative korean regex")
        });

        match self {
            TextFamily::KoreanLabeled => &*KOREAN_LABELED,
            TextFamily::IsoDateTime => &*ISO_DATETIME,
            TextFamily::IsoDate => &*ISO_DATE,
            TextFamily::KoreanLong => &*KOREAN_LONG,
            TextFamily::DottedYmd => &*DOTTED,
            TextFamily::EnglishMonthDay => &*EN_MD,
            TextFamily::EnglishDayMonth => &*EN_DM,
            TextFamily::RelativeEnglish => &*REL_EN,
            TextFamily::RelativeKorean => &*REL_KO,
        }
    }

    fn parse(
        &self,
        caps: &Captures,
        utc_offset_hours: i32,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        match self {
            TextFamily::RelativeEnglish | TextFamily::RelativeKorean => {
                let n: i64 = cap_num(caps, "n")?;
                let unit = caps.name("unit")?.as_str().to_ascii_lowercase();
                let delta = if unit.starts_with("min") || unit == "분" {
                    Duration::minutes(n)
                } else if unit.starts_with('h') || unit == "시간" {
                    Duration::hours(n)
                } else {
                    Duration::days(n)
                };
                Some(now - delta)
            }
            TextFamily::IsoDateTime => {
                let naive = NaiveDate::from_ymd_opt(
                    cap_num(caps, "y")?,
                    cap_num(caps, "m")?,
                    cap_num(caps, "d")?,
                )?
                .and_hms_opt(
                    cap_num(caps, "hh")?,
                    cap_num(caps, "mm")?,
                    cap_num(caps, "ss").unwrap_or(0),
                )?;
                match caps.name("tz").map(|m| m.as_str()) {
                    Some("Z") => Some(Utc.from_utc_datetime(&naive)),
                    Some(tz) => {
                        let offset = parse_offset(tz)?;
                        offset
                            .from_local_datetime(&naive)
                            .single()
                            .map(|dt| dt.with_timezone(&Utc))
                    }
                    None => local_to_utc(naive, utc_offset_hours),
                }
            }
            TextFamily::EnglishMonthDay | TextFamily::EnglishDayMonth => ymd_hm(
                cap_num(caps, "y")?,
                month_from_name(caps.name("mon")?.as_str())?,
                cap_num(caps, "d")?,
                0,
                0,
                utc_offset_hours,
            ),
            _ => ymd_hm(
                cap_num(caps, "y")?,
                cap_num(caps, "m")?,
                cap_num(caps, "d")?,
                cap_num(caps, "hh").unwrap_or(0),
                cap_num(caps, "mm").unwrap_or(0),
                utc_offset_hours,
            ),
        }
    }
}

fn parse_offset(tz: &str) -> Option<FixedOffset> {
    let sign = if tz.starts_with('-') { -1 } else { 1 };
    let digits: String = tz.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 4 {
        return None;
    }
    let hh: i32 = digits[..2].parse().ok()?;
    let mm: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hh * 3600 + mm * 60))
}

fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let m = match lower.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(m)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextDate {
    pub date: DateTime<Utc>,
    pub family: TextFamily,
}

/// Scan free text with every family in priority order; first plausible match wins.
pub fn date_from_text(text: &str, utc_offset_hours: i32, now: DateTime<Utc>) -> Option<TextDate> {
    TextFamily::ALL
        .iter()
        .find_map(|family| date_from_text_with(text, *family, utc_offset_hours, now))
}

/// Scan free text with one family only.
pub fn date_from_text_with(
    text: &str,
    family: TextFamily,
    utc_offset_hours: i32,
    now: DateTime<Utc>,
) -> Option<TextDate> {
    family
        .regex()
        .captures_iter(text)
        .filter_map(|caps| family.parse(&caps, utc_offset_hours, now))
        .find(|d| is_plausible(*d, now))
        .map(|date| TextDate { date, family })
}

/// Parse a structured timestamp (meta tag content, `datetime` attribute).
/// RFC 3339 first, then RFC 2822, then the text families.
pub fn parse_structured(raw: &str, utc_offset_hours: i32, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| date_from_text(raw, utc_offset_hours, now).map(|t| t.date))?;
    is_plausible(parsed, now).then_some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 25, 12, 0, 0).unwrap()
    }

    fn all_url_patterns() -> Vec<UrlPattern> {
        [
            UrlFamily::DashedYmd,
            UrlFamily::SlashedYmd,
            UrlFamily::CompactStamp,
            UrlFamily::CompactYmd,
            UrlFamily::IdxnoYmd,
            UrlFamily::AkrYmd,
            UrlFamily::UnixEpoch,
            UrlFamily::HexEpoch,
        ]
        .into_iter()
        .map(|f| UrlPattern::new(f, 1.0))
        .collect()
    }

    fn ymd(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn dashed_permalink() {
        let hit = date_from_url(
            "https://www.bloomberg.com/news/articles/2025-08-25/market-update",
            &all_url_patterns(),
            0,
            now(),
        )
        .unwrap();
        assert_eq!(hit.family, UrlFamily::DashedYmd);
        assert_eq!(hit.date, ymd(2025, 8, 25));
    }

    #[test]
    fn wire_suffix_and_slashed_paths() {
        let p = all_url_patterns();
        let r = date_from_url(
            "https://www.reuters.com/markets/us/stocks-rally-2025-08-24/",
            &p,
            0,
            now(),
        )
        .unwrap();
        assert_eq!(r.date, ymd(2025, 8, 24));

        let s = date_from_url("https://www.cnbc.com/2025/08/23/fed-minutes.html", &p, 0, now())
            .unwrap();
        assert_eq!(s.family, UrlFamily::SlashedYmd);
        assert_eq!(s.date, ymd(2025, 8, 23));
    }

    #[test]
    fn korean_ids_use_source_offset() {
        let p = all_url_patterns();
        let idx = date_from_url(
            "https://www.example.co.kr/news/articleView.html?idxno=202508251234",
            &[UrlPattern::new(UrlFamily::IdxnoYmd, 1.0)],
            9,
            now(),
        )
        .unwrap();
        // Midnight KST is 15:00 UTC the day before.
        assert_eq!(idx.date, Utc.with_ymd_and_hms(2025, 8, 24, 15, 0, 0).unwrap());

        let akr = date_from_url(
            "https://www.yna.co.kr/view/AKR20250824012300002",
            &p,
            9,
            now(),
        )
        .unwrap();
        assert_eq!(akr.family, UrlFamily::AkrYmd);

        let stamp = date_from_url("https://www.hankyung.com/article/202508250930i", &p, 9, now())
            .unwrap();
        assert_eq!(stamp.family, UrlFamily::CompactStamp);
        assert_eq!(stamp.date, Utc.with_ymd_and_hms(2025, 8, 25, 0, 30, 0).unwrap());
    }

    #[test]
    fn epoch_suffixes() {
        let p = all_url_patterns();
        let secs = now().timestamp() - 3600;
        let e = date_from_url(&format!("https://x.test/post/{secs}/slug"), &p, 0, now()).unwrap();
        assert_eq!(e.family, UrlFamily::UnixEpoch);
        assert_eq!(e.date.timestamp(), secs);

        let hex = format!("{:x}", secs);
        let h = date_from_url(&format!("https://x.test/story-{hex}"), &p, 0, now()).unwrap();
        assert_eq!(h.family, UrlFamily::HexEpoch);
        assert_eq!(h.date.timestamp(), secs);
    }

    #[test]
    fn implausible_dates_are_rejected() {
        let p = all_url_patterns();
        assert!(date_from_url("https://x.test/2031/01/01/future", &p, 0, now()).is_none());
        assert!(date_from_url("https://x.test/opaque-permalink", &p, 0, now()).is_none());
        // Host digits never count.
        assert!(date_from_url("https://2025-08-25.example.com/", &p, 0, now()).is_none());
    }

    #[test]
    fn text_families_in_priority_order() {
        let k = date_from_text("작성일: 2025-08-25", 9, now()).unwrap();
        assert_eq!(k.family, TextFamily::KoreanLabeled);
        assert_eq!(k.date, Utc.with_ymd_and_hms(2025, 8, 24, 15, 0, 0).unwrap());

        let iso = date_from_text("posted 2025-08-24T10:15:00Z by staff", 0, now()).unwrap();
        assert_eq!(iso.family, TextFamily::IsoDateTime);
        assert_eq!(iso.date, Utc.with_ymd_and_hms(2025, 8, 24, 10, 15, 0).unwrap());

        let long = date_from_text("기사 2025년 8월 24일 오후", 0, now()).unwrap();
        assert_eq!(long.date, ymd(2025, 8, 24));

        let dotted = date_from_text("입력 시각 2025.08.23 기준", 0, now()).unwrap();
        assert_eq!(dotted.family, TextFamily::DottedYmd);

        let md = date_from_text("Published August 22, 2025", 0, now()).unwrap();
        assert_eq!(md.date, ymd(2025, 8, 22));

        let dm = date_from_text("Updated 21 Aug 2025", 0, now()).unwrap();
        assert_eq!(dm.family, TextFamily::EnglishDayMonth);
        assert_eq!(dm.date, ymd(2025, 8, 21));
    }

    #[test]
    fn relative_phrases_anchor_on_now() {
        let en = date_from_text("updated 3 hours ago", 0, now()).unwrap();
        assert_eq!(en.date, now() - Duration::hours(3));
        assert!(en.family.is_relative());

        let ko = date_from_text("15분 전", 9, now()).unwrap();
        assert_eq!(ko.date, now() - Duration::minutes(15));
    }

    #[test]
    fn structured_values() {
        let d = parse_structured("2025-08-25T08:00:00+09:00", 0, now()).unwrap();
        assert_eq!(d, Utc.with_ymd_and_hms(2025, 8, 24, 23, 0, 0).unwrap());
        let r = parse_structured("Sun, 24 Aug 2025 10:00:00 GMT", 0, now()).unwrap();
        assert_eq!(r, Utc.with_ymd_and_hms(2025, 8, 24, 10, 0, 0).unwrap());
        assert!(parse_structured("1999-01-01T00:00:00Z", 0, now()).is_none());
        assert!(parse_structured("", 0, now()).is_none());
    }
}
