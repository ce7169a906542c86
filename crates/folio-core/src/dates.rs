//! Date parsing, ordering and display for the loosely formatted date strings
//! stored in the document.

use chrono::NaiveDate;

pub const PRESENT: &str = "present";

/// Position of a date on the timeline. Ongoing items sort after every dated
/// item; unparseable dates sort first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Chronology {
    Unknown,
    Dated(NaiveDate),
    Ongoing,
}

pub fn is_ongoing(end_date: Option<&str>) -> bool {
    match end_date {
        None => true,
        Some(value) => value.trim().eq_ignore_ascii_case(PRESENT),
    }
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM` and `YYYY`, with an optional trailing
/// RFC 3339 time part.
pub fn parse_loose_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let value = value.split('T').next().unwrap_or(value);
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d") {
        return Some(date);
    }
    value
        .parse::<i32>()
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
}

pub fn start_chronology(start_date: &str) -> Chronology {
    parse_loose_date(start_date).map_or(Chronology::Unknown, Chronology::Dated)
}

pub fn end_chronology(end_date: Option<&str>) -> Chronology {
    if is_ongoing(end_date) {
        return Chronology::Ongoing;
    }
    end_date
        .and_then(parse_loose_date)
        .map_or(Chronology::Unknown, Chronology::Dated)
}

/// Key for newest-first ordering: by end date, then by start date.
pub fn recency_key(start_date: &str, end_date: Option<&str>) -> (Chronology, Chronology) {
    (end_chronology(end_date), start_chronology(start_date))
}

/// `Jan 2023`. Unparseable input is returned unchanged.
pub fn format_month_short(value: &str) -> String {
    parse_loose_date(value)
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| value.to_string())
}

/// `January 2023`. Unparseable input is returned unchanged.
pub fn format_month_long(value: &str) -> String {
    parse_loose_date(value)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_else(|| value.to_string())
}

/// `Jan 2023 - Present` style range used on the timeline pages.
pub fn format_range(start_date: &str, end_date: Option<&str>) -> String {
    let end = match end_date {
        Some(end) if !is_ongoing(Some(end)) => format_month_short(end),
        _ => "Present".to_string(),
    };
    format!("{} - {}", format_month_short(start_date), end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_sentinel_and_null_are_ongoing() {
        assert!(is_ongoing(None));
        assert!(is_ongoing(Some("present")));
        assert!(is_ongoing(Some("Present")));
        assert!(!is_ongoing(Some("2022-12-01")));
    }

    #[test]
    fn ongoing_sorts_after_every_dated_item() {
        let mut keys = vec![
            recency_key("2021-01-01", Some("2023-05-01")),
            recency_key("2020-01-01", None),
            recency_key("2019-01-01", Some("garbage")),
            recency_key("2022-01-01", Some("present")),
        ];
        keys.sort();
        assert_eq!(keys[0].0, Chronology::Unknown);
        assert!(matches!(keys[1].0, Chronology::Dated(_)));
        assert_eq!(keys[2].0, Chronology::Ongoing);
        assert_eq!(keys[3].0, Chronology::Ongoing);
        // ties on ongoing fall back to the later start
        assert!(keys[3].1 > keys[2].1);
    }

    #[test]
    fn loose_dates_parse_at_several_precisions() {
        assert_eq!(parse_loose_date("2023-04-09"), NaiveDate::from_ymd_opt(2023, 4, 9));
        assert_eq!(parse_loose_date("2023-04"), NaiveDate::from_ymd_opt(2023, 4, 1));
        assert_eq!(parse_loose_date("2023"), NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(
            parse_loose_date("2023-04-09T10:00:00Z"),
            NaiveDate::from_ymd_opt(2023, 4, 9)
        );
        assert_eq!(parse_loose_date("soon"), None);
    }

    #[test]
    fn ranges_render_present_for_ongoing_items() {
        assert_eq!(format_range("2023-01-01", None), "Jan 2023 - Present");
        assert_eq!(format_range("2021-08-01", Some("2022-12-01")), "Aug 2021 - Dec 2022");
        assert_eq!(format_month_long("2021-06-15"), "June 2021");
        assert_eq!(format_month_short("3 years"), "3 years");
    }
}
