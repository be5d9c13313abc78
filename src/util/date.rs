use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

const COMMON_DATE_FORMATS: &[&str] = &[
  "%Y-%m-%d %H:%M:%S",    // Common format without timezone
  "%Y-%m-%d %H:%M:%S %z", // Common format with timezone
  "%Y-%m-%dT%H:%M:%S",    // ISO without offset
];

/// Lenient parser for the free-form date strings found in feeds.
///
/// Times without an offset are read as UTC so that the same feed
/// produces the same ordering regardless of the host timezone.
pub fn parse_date(date_str: impl AsRef<str>) -> Option<DateTime<FixedOffset>> {
  let date_str = date_str.as_ref().trim();
  if date_str.is_empty() {
    return None;
  }

  if let Ok(parsed) = DateTime::parse_from_rfc3339(date_str) {
    return Some(parsed);
  }

  if let Ok(parsed) = DateTime::parse_from_rfc2822(date_str) {
    return Some(parsed);
  }

  for fmt in COMMON_DATE_FORMATS {
    if let Ok(parsed) = DateTime::parse_from_str(date_str, fmt) {
      return Some(parsed);
    }

    if let Ok(parsed) = NaiveDateTime::parse_from_str(date_str, fmt) {
      return Some(parsed.and_utc().fixed_offset());
    }
  }

  NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
    .ok()
    .and_then(|date| date.and_hms_opt(0, 0, 0))
    .map(|date| date.and_utc().fixed_offset())
}

/// The timestamp format the AT Protocol expects in `createdAt`.
pub fn to_record_timestamp(date: &DateTime<FixedOffset>) -> String {
  date
    .with_timezone(&Utc)
    .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn test_parse_rfc2822_and_rfc3339() {
    let a = parse_date("Tue, 10 Jun 2025 04:00:00 GMT").unwrap();
    let b = parse_date("2025-06-10T04:00:00Z").unwrap();
    assert_eq!(a, b);
  }

  #[test]
  fn test_parse_naive_as_utc() {
    let parsed = parse_date("2025-06-10 04:00:00").unwrap();
    assert_eq!(parsed.timestamp(), 1_749_528_000);

    let date_only = parse_date("2025-06-10").unwrap();
    assert_eq!(date_only.timestamp(), 1_749_513_600);
  }

  #[test]
  fn test_parse_garbage() {
    assert_eq!(parse_date("   "), None);
    assert_eq!(parse_date("last tuesday"), None);
  }

  #[test]
  fn test_record_timestamp_is_utc_millis() {
    let date = DateTime::parse_from_rfc3339("2025-06-10T06:30:00+02:00")
      .unwrap();
    assert_eq!(to_record_timestamp(&date), "2025-06-10T04:30:00.000Z");
  }
}
