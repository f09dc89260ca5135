//! Fuzzy date/time parsing for scraped publish dates.
//!
//! Site markup hands us anything from a clean RFC 3339 `datetime` attribute
//! to `"Updated: March 05, 2024 - 10:15 AM"` or `"5 days ago"`. The parser
//! tries a fixed list of recognizers in order and returns the first hit,
//! searching inside longer strings rather than requiring an exact match.
//!
//! Partial dates borrow what they lack from "now": a month and day with no
//! year get the current year, a month and year get the first of the month,
//! and a bare clock time gets today's date.
//!
//! Times without an explicit zone are taken as UTC.

use crate::utils::collapse_whitespace;
use chrono::{
    DateTime, Datelike, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc,
};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const MONTHS: &str = "january|february|march|april|may|june|july|august|september|october|november|december|jan|feb|mar|apr|jun|jul|aug|sept|sep|oct|nov|dec";

static ISO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(\d{4})-(\d{1,2})-(\d{1,2})(?:[t ](\d{1,2}):(\d{2})(?::(\d{2})(?:[.,](\d{1,9}))?)?)?\s*(z\b|[+-]\d{2}:?\d{2}\b)?",
    )
    .unwrap()
});

static MONTH_FIRST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b({MONTHS})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})\b"
    ))
    .unwrap()
});

static DAY_FIRST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTHS})\.?,?\s+(\d{{4}})\b"
    ))
    .unwrap()
});

static MONTH_YEAR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b({MONTHS})\b\.?,?\s+(\d{{4}})\b")).unwrap()
});

static MONTH_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b({MONTHS})\b\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b"
    ))
    .unwrap()
});

static DAY_MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTHS})\b\.?"
    ))
    .unwrap()
});

/// A year right after a yearless match means a full date that failed to
/// validate; it must not be retried with the current year.
static YEAR_FOLLOWS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\.?,?\s*\d{4}\b").unwrap());

static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap());

static CLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,2}):(\d{2})(?::(\d{2}))?(?:\s*([ap])\.?m\b\.?)?").unwrap()
});

static RELATIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(\d+|an?|one)\s+(seconds?|secs?|minutes?|mins?|hours?|hrs?|days?|weeks?|months?|years?)\s+ago\b",
    )
    .unwrap()
});

static YESTERDAY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\byesterday\b").unwrap());

type Recognizer = fn(&str, DateTime<Utc>) -> Option<DateTime<Utc>>;

/// Recognizers in the order they are tried.
const RECOGNIZERS: &[Recognizer] = &[
    rfc_formats,
    embedded_iso,
    month_name_first,
    day_first_month_name,
    numeric_us,
    relative,
    month_year,
    month_day,
    day_month,
    clock_only,
];

/// Parse a date out of free-form text, relative to the current time.
pub fn parse_fuzzy(input: &str) -> Option<DateTime<Utc>> {
    parse_fuzzy_at(input, Utc::now())
}

/// Like [`parse_fuzzy`], with an explicit "now" for relative expressions.
pub fn parse_fuzzy_at(input: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let text = collapse_whitespace(input);
    if text.is_empty() {
        return None;
    }
    RECOGNIZERS.iter().find_map(|recognize| recognize(&text, now))
}

fn rfc_formats(text: &str, _now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_rfc2822(text))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn embedded_iso(text: &str, _now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let caps = ISO_RE.captures(text)?;
    let date = NaiveDate::from_ymd_opt(number(&caps, 1)? as i32, number(&caps, 2)?, number(&caps, 3)?)?;

    let time = match caps.get(4) {
        Some(_) => {
            let nanos = match caps.get(7) {
                Some(frac) => format!("{:0<9}", frac.as_str()).parse::<u32>().ok()?,
                None => 0,
            };
            NaiveTime::from_hms_nano_opt(
                number(&caps, 4)?,
                number(&caps, 5)?,
                number(&caps, 6).unwrap_or(0),
                nanos,
            )?
        }
        None => NaiveTime::MIN,
    };

    let offset = match caps.get(8) {
        Some(zone) => Some(parse_offset(zone.as_str())?),
        None => None,
    };
    to_utc(date.and_time(time), offset)
}

fn month_name_first(text: &str, _now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let caps = MONTH_FIRST_RE.captures(text)?;
    let month = month_number(caps.get(1)?.as_str())?;
    let date = NaiveDate::from_ymd_opt(number(&caps, 3)? as i32, month, number(&caps, 2)?)?;
    to_utc(date.and_time(clock_time(text).unwrap_or(NaiveTime::MIN)), None)
}

fn day_first_month_name(text: &str, _now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let caps = DAY_FIRST_RE.captures(text)?;
    let month = month_number(caps.get(2)?.as_str())?;
    let date = NaiveDate::from_ymd_opt(number(&caps, 3)? as i32, month, number(&caps, 1)?)?;
    to_utc(date.and_time(clock_time(text).unwrap_or(NaiveTime::MIN)), None)
}

/// `MM/DD/YYYY`, or `DD/MM/YYYY` when the first field cannot be a month.
fn numeric_us(text: &str, _now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let caps = NUMERIC_RE.captures(text)?;
    let (first, second, year) = (number(&caps, 1)?, number(&caps, 2)?, number(&caps, 3)? as i32);
    let (month, day) = if first > 12 { (second, first) } else { (first, second) };
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    to_utc(date.and_time(clock_time(text).unwrap_or(NaiveTime::MIN)), None)
}

fn relative(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if let Some(caps) = RELATIVE_RE.captures(text) {
        let amount = match caps.get(1)?.as_str().to_ascii_lowercase().as_str() {
            "a" | "an" | "one" => 1,
            digits => digits.parse::<u32>().ok()?,
        };
        let unit = caps.get(2)?.as_str().to_ascii_lowercase();
        let amount_i64 = i64::from(amount);

        return if unit.starts_with("sec") {
            now.checked_sub_signed(TimeDelta::try_seconds(amount_i64)?)
        } else if unit.starts_with("min") {
            now.checked_sub_signed(TimeDelta::try_minutes(amount_i64)?)
        } else if unit.starts_with('h') {
            now.checked_sub_signed(TimeDelta::try_hours(amount_i64)?)
        } else if unit.starts_with("day") {
            now.checked_sub_signed(TimeDelta::try_days(amount_i64)?)
        } else if unit.starts_with("week") {
            now.checked_sub_signed(TimeDelta::try_weeks(amount_i64)?)
        } else if unit.starts_with("month") {
            now.checked_sub_months(Months::new(amount))
        } else {
            now.checked_sub_months(Months::new(amount.checked_mul(12)?))
        };
    }

    if YESTERDAY_RE.is_match(text) {
        return now.checked_sub_signed(TimeDelta::try_days(1)?);
    }
    None
}

/// `January 2024`: the first of the month.
fn month_year(text: &str, _now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    // `29 Feb 2023` names a day; it already failed validation upstream.
    if DAY_MONTH_RE.is_match(text) {
        return None;
    }
    let caps = MONTH_YEAR_RE.captures(text)?;
    let month = month_number(caps.get(1)?.as_str())?;
    let date = NaiveDate::from_ymd_opt(number(&caps, 2)? as i32, month, 1)?;
    to_utc(date.and_time(NaiveTime::MIN), None)
}

/// `Jan 5`, `March 3rd at 10:15 AM`: the current year.
fn month_day(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let caps = MONTH_DAY_RE.captures(text)?;
    if YEAR_FOLLOWS_RE.is_match(&text[caps.get(0)?.end()..]) {
        return None;
    }
    let month = month_number(caps.get(1)?.as_str())?;
    let date = NaiveDate::from_ymd_opt(now.year(), month, number(&caps, 2)?)?;
    to_utc(date.and_time(clock_time(text).unwrap_or(NaiveTime::MIN)), None)
}

/// `5 March`, `21st of Feb`: the current year.
fn day_month(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let caps = DAY_MONTH_RE.captures(text)?;
    if YEAR_FOLLOWS_RE.is_match(&text[caps.get(0)?.end()..]) {
        return None;
    }
    let month = month_number(caps.get(2)?.as_str())?;
    let date = NaiveDate::from_ymd_opt(now.year(), month, number(&caps, 1)?)?;
    to_utc(date.and_time(clock_time(text).unwrap_or(NaiveTime::MIN)), None)
}

/// A time of day with no date at all: today.
fn clock_only(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let time = clock_time(text)?;
    to_utc(now.date_naive().and_time(time), None)
}

/// First wall-clock time mentioned in the text, e.g. `10:15 AM` or `22:05:09`.
fn clock_time(text: &str) -> Option<NaiveTime> {
    let caps = CLOCK_RE.captures(text)?;
    let mut hour = number(&caps, 1)?;
    let minute = number(&caps, 2)?;
    let second = number(&caps, 3).unwrap_or(0);

    if let Some(meridiem) = caps.get(4) {
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = meridiem.as_str().eq_ignore_ascii_case("p");
        hour = match (pm, hour) {
            (false, 12) => 0,
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, h) => h,
        };
    }
    NaiveTime::from_hms_opt(hour, minute, second)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.chars().take(3).collect::<String>().to_ascii_lowercase();
    let month = match prefix.as_str() {
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
    Some(month)
}

/// `Z`, `+05:30` or `-0800`.
fn parse_offset(zone: &str) -> Option<FixedOffset> {
    if zone.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }
    let sign = if zone.starts_with('-') { -1 } else { 1 };
    let digits: String = zone.chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 4 {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn to_utc(naive: NaiveDateTime, offset: Option<FixedOffset>) -> Option<DateTime<Utc>> {
    match offset {
        Some(offset) => offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc)),
        None => Some(Utc.from_utc_datetime(&naive)),
    }
}

fn number(caps: &Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index)?.as_str().parse().ok()
}
