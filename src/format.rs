use chrono::{Datelike, NaiveDate, NaiveDateTime};

pub const CURRENCY_PREFIX: &str = "$";

const MONTH_NAMES: [&str; 12] = [
  "enero",
  "febrero",
  "marzo",
  "abril",
  "mayo",
  "junio",
  "julio",
  "agosto",
  "septiembre",
  "octubre",
  "noviembre",
  "diciembre",
];

/// Tolerant wire-timestamp parse. The store delivers RFC3339, naive
/// datetimes or bare dates depending on the record's age.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }
  if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(trimmed) {
    return Some(parsed.naive_utc());
  }
  if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
    return Some(parsed);
  }
  NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok().map(|date| date.and_hms_opt(0, 0, 0).unwrap_or_default())
}

/// Calendar day of a wire timestamp, ignoring time-of-day.
pub fn day_of(raw: &str) -> Option<NaiveDate> {
  parse_timestamp(raw).map(|ts| ts.date())
}

/// "YYYY-MM" bucket key used by the month-set export mode.
pub fn month_token(date: NaiveDate) -> String {
  format!("{:04}-{:02}", date.year(), date.month())
}

/// Division with a 0 substitute for a zero denominator, so NaN/Infinity
/// never reach a rendered cell or a layout computation.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
  if denominator.abs() < f64::EPSILON {
    0.0
  } else {
    numerator / denominator
  }
}

pub fn currency(value: f64) -> String {
  format!("{}{:.2}", CURRENCY_PREFIX, value)
}

pub fn percent(value: f64) -> String {
  format!("{:.1}%", value)
}

pub fn short_date(date: NaiveDate) -> String {
  date.format("%d/%m/%Y").to_string()
}

pub fn long_date(date: NaiveDate) -> String {
  let month = MONTH_NAMES[(date.month() as usize) - 1];
  format!("{} de {} de {}", date.day(), month, date.year())
}

/// Hard character budget with an ellipsis marker; budgets live in
/// `ReportStyle` next to the font metrics they were tuned against.
pub fn truncate(text: &str, max_chars: usize) -> String {
  if text.chars().count() <= max_chars {
    return text.to_string();
  }
  let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
  format!("{}...", kept.trim_end())
}
