//! Field classification: decides whether a raw cell sorts as a date, a
//! language-tagged string, or plain text.

use std::{cmp::Ordering, fmt, sync::OnceLock};

use chrono::NaiveDate;
use regex::Regex;

use crate::{
    compare::compare_values,
    sort_spec::{ColumnHint, LanguageOptions},
};

/// Date layouts in priority order; the first pattern that yields a valid
/// calendar date wins. Missing month/day components default to 1.
const DATE_PATTERNS: &[&str] = &[
    r"^(?P<y>\d{4})-(?P<m>\d{1,2})-(?P<d>\d{1,2})$",
    r"^(?P<y>\d{4})/(?P<m>\d{1,2})/(?P<d>\d{1,2})$",
    r"^(?P<d>\d{1,2})-(?P<m>\d{1,2})-(?P<y>\d{4})$",
    r"^(?P<d>\d{1,2})/(?P<m>\d{1,2})/(?P<y>\d{4})$",
    r"^(?P<y>\d{4})$",
    r"^(?P<y>\d{4})-(?P<m>\d{1,2})$",
    r"^(?P<m>\d{1,2})-(?P<y>\d{4})$",
    r"^(?P<m>\d{1,2})/(?P<d>\d{1,2})/(?P<y>\d{4})$",
    r"^(?P<d>\d{1,2})\.(?P<m>\d{1,2})\.(?P<y>\d{4})$",
    r"^(?P<y>\d{4})\.(?P<m>\d{1,2})\.(?P<d>\d{1,2})$",
];

static DATE_REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();

fn date_regexes() -> &'static [Regex] {
    DATE_REGEXES.get_or_init(|| {
        DATE_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern).expect("date pattern compiles"))
            .collect()
    })
}

/// A cell value prepared for comparison.
///
/// Variants order before each other as `Date < LanguageTagged < PlainText`,
/// so a column mixing dates and free text lists every dated row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedValue {
    Date(NaiveDate),
    LanguageTagged { rank: usize, text: String },
    PlainText(String),
}

impl ClassifiedValue {
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            ClassifiedValue::Date(_) => 0,
            ClassifiedValue::LanguageTagged { .. } => 1,
            ClassifiedValue::PlainText(_) => 2,
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, ClassifiedValue::Date(_))
    }
}

impl Ord for ClassifiedValue {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_values(self, other)
    }
}

impl PartialOrd for ClassifiedValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ClassifiedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifiedValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            ClassifiedValue::LanguageTagged { rank, text } => write!(f, "{text} (#{rank})"),
            ClassifiedValue::PlainText(s) => f.write_str(s),
        }
    }
}

/// Parses `value` against the known date layouts.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    date_regexes().iter().find_map(|regex| {
        let caps = regex.captures(value)?;
        let component = |name: &str| -> Option<u32> {
            caps.name(name).map_or(Some(1), |m| m.as_str().parse::<u32>().ok())
        };
        let year = caps.name("y")?.as_str().parse::<i32>().ok()?;
        NaiveDate::from_ymd_opt(year, component("m")?, component("d")?)
    })
}

/// Classifies a sort-column cell.
pub fn classify(raw: &str, hint: ColumnHint) -> ClassifiedValue {
    let value = raw.trim();
    let date = match hint {
        ColumnHint::Text => None,
        ColumnHint::Auto | ColumnHint::Date => parse_date(value),
    };
    match date {
        Some(date) => ClassifiedValue::Date(date),
        None => ClassifiedValue::PlainText(value.to_string()),
    }
}

/// Classifies the designated language cell of a row.
pub fn classify_language(raw: &str, options: &LanguageOptions) -> ClassifiedValue {
    let text = raw.trim();
    ClassifiedValue::LanguageTagged {
        rank: language_rank(text, &options.order),
        text: text.to_string(),
    }
}

/// Rank of `value` within `order`. Explicit labels (`EN`, `cn`, ...) match
/// case-insensitively; anything else is tagged by script. Empty values and
/// tags missing from `order` rank after every listed language.
pub fn language_rank(value: &str, order: &[String]) -> usize {
    let value = value.trim();
    if value.is_empty() {
        return order.len();
    }
    let position = |label: &str| order.iter().position(|l| l.trim().eq_ignore_ascii_case(label));
    position(value)
        .or_else(|| position(detect_language(value)))
        .unwrap_or(order.len())
}

/// `"CN"` when CJK characters outnumber other letters, `"EN"` otherwise.
/// Full-width Latin letters count as Latin.
pub fn detect_language(value: &str) -> &'static str {
    let (cjk, other) = value.chars().fold((0usize, 0usize), |(cjk, other), ch| {
        if is_cjk(ch) {
            (cjk + 1, other)
        } else if ch.is_alphabetic() {
            (cjk, other + 1)
        } else {
            (cjk, other)
        }
    });
    if cjk > other { "CN" } else { "EN" }
}

/// Han, kana, hangul and bopomofo characters. Punctuation and full-width
/// Latin forms are not script characters and do not count.
pub fn is_cjk(ch: char) -> bool {
    matches!(
        ch as u32,
        0x1100..=0x11FF       // Hangul Jamo
            | 0x2E80..=0x2FDF // radicals
            | 0x3005..=0x3007 // iteration mark, closing mark, ideographic zero
            | 0x3040..=0x30FF // Hiragana, Katakana
            | 0x3100..=0x31FF // Bopomofo, Hangul compatibility, Katakana ext
            | 0x3400..=0x4DBF // Extension A
            | 0x4E00..=0x9FFF // Unified Ideographs
            | 0xA960..=0xA97F // Hangul Jamo ext A
            | 0xAC00..=0xD7FF // Hangul syllables, Jamo ext B
            | 0xF900..=0xFAFF // Compatibility Ideographs
            | 0xFF66..=0xFFDC // halfwidth Katakana and Hangul
            | 0x20000..=0x2FA1F
    )
}
