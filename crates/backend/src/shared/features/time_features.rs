use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use contracts::shared::order_schema::{is_date_column, MISSING_TIME_PART, TIME_FEATURES};
use polars::prelude::*;

use crate::shared::frame::{column_names, FrameError};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];

/// First column whose name contains "date" or "creation" (case-insensitive)
pub fn find_date_column(frame: &DataFrame) -> Option<String> {
    column_names(frame)
        .into_iter()
        .find(|name| is_date_column(name))
}

/// Lenient timestamp parsing; anything unrecognised is `None`
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Parses every cell of a column; numeric columns never hold timestamps
pub fn parse_datetime_column(column: &Column) -> Vec<Option<NaiveDateTime>> {
    let series = column.as_materialized_series();
    match series.str() {
        Ok(cells) => cells
            .into_iter()
            .map(|cell| cell.and_then(parse_datetime))
            .collect(),
        Err(_) => vec![None; series.len()],
    }
}

fn time_part(name: &str, dt: &NaiveDateTime) -> i64 {
    match name {
        "year" => dt.year() as i64,
        "month" => dt.month() as i64,
        "day" => dt.day() as i64,
        "hour" => dt.hour() as i64,
        "minute" => dt.minute() as i64,
        "dayofweek" => dt.weekday().num_days_from_monday() as i64,
        "timestamp" => dt.and_utc().timestamp(),
        _ => MISSING_TIME_PART,
    }
}

/// Replaces the creation-date column by integer calendar features.
///
/// Returns the name of the consumed column, or `None` when no column
/// matches the date heuristic (the frame is then left untouched).
pub fn derive_time_features(frame: &mut DataFrame) -> Result<Option<String>, FrameError> {
    let Some(date_col) = find_date_column(frame) else {
        return Ok(None);
    };
    let parsed = parse_datetime_column(frame.column(&date_col)?);

    let unparsed = parsed.iter().filter(|v| v.is_none()).count();
    if unparsed > 0 {
        tracing::debug!(
            "Column '{}': {} of {} timestamps could not be parsed",
            date_col,
            unparsed,
            parsed.len()
        );
    }

    for name in TIME_FEATURES {
        let values: Vec<i64> = parsed
            .iter()
            .map(|dt| {
                dt.as_ref()
                    .map(|dt| time_part(name, dt))
                    .unwrap_or(MISSING_TIME_PART)
            })
            .collect();
        frame.with_column(Series::new((*name).into(), values))?;
    }
    frame.drop_in_place(&date_col)?;

    Ok(Some(date_col))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(frame: &DataFrame, name: &str) -> Vec<i64> {
        frame
            .column(name)
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap())
            .collect()
    }

    fn dates(name: &str, cells: &[Option<&str>]) -> Column {
        Series::new(name.into(), cells).into()
    }

    #[test]
    fn parses_common_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 0)
            .unwrap();
        assert_eq!(parse_datetime("2024-03-09 14:05:00"), Some(expected));
        assert_eq!(parse_datetime("2024-03-09T14:05"), Some(expected));
        assert_eq!(parse_datetime("09/03/2024 14:05"), Some(expected));
        assert_eq!(parse_datetime("2024-03-09T14:05:00+01:00"), Some(expected));
        assert!(parse_datetime("2024-03-09").is_some());
        assert_eq!(parse_datetime("not a date"), None);
        assert_eq!(parse_datetime(""), None);
    }

    #[test]
    fn derives_calendar_fields_and_drops_source() {
        let mut frame = DataFrame::new(vec![
            dates(
                "Date_Creation",
                &[Some("2024-03-11 08:30:00"), Some("garbage"), None],
            ),
            Series::new("Quantite".into(), &[1i64, 2, 3]).into(),
        ])
        .unwrap();

        let used = derive_time_features(&mut frame).unwrap();
        assert_eq!(used.as_deref(), Some("Date_Creation"));
        assert!(frame.column("Date_Creation").is_err());

        assert_eq!(ints(&frame, "year"), vec![2024, -1, -1]);
        assert_eq!(ints(&frame, "month"), vec![3, -1, -1]);
        assert_eq!(ints(&frame, "day"), vec![11, -1, -1]);
        assert_eq!(ints(&frame, "hour"), vec![8, -1, -1]);
        assert_eq!(ints(&frame, "minute"), vec![30, -1, -1]);
        // 2024-03-11 is a Monday
        assert_eq!(ints(&frame, "dayofweek"), vec![0, -1, -1]);
        assert_eq!(ints(&frame, "timestamp"), vec![1710145800, -1, -1]);
    }

    #[test]
    fn derived_fields_stay_in_calendar_ranges() {
        let stamps = [
            Some("2023-01-01 00:00:00"),
            Some("2023-12-31 23:59:59"),
            Some("2024-02-29 12:00:00"),
            Some("2025-07-06 18:45:10"),
        ];
        let mut frame = DataFrame::new(vec![dates("creation_ts", &stamps)]).unwrap();
        derive_time_features(&mut frame).unwrap();

        for m in ints(&frame, "month") {
            assert!((1..=12).contains(&m));
        }
        for d in ints(&frame, "day") {
            assert!((1..=31).contains(&d));
        }
        for h in ints(&frame, "hour") {
            assert!((0..=23).contains(&h));
        }
        for m in ints(&frame, "minute") {
            assert!((0..=59).contains(&m));
        }
        for w in ints(&frame, "dayofweek") {
            assert!((0..=6).contains(&w));
        }
        // 2025-07-06 is a Sunday
        assert_eq!(ints(&frame, "dayofweek")[3], 6);
    }

    #[test]
    fn numeric_date_column_is_unparseable() {
        let mut frame =
            DataFrame::new(vec![Series::new("date_creation".into(), &[45000i64]).into()]).unwrap();
        derive_time_features(&mut frame).unwrap();
        assert_eq!(ints(&frame, "year"), vec![-1]);
    }

    #[test]
    fn no_date_column_is_a_noop() {
        let mut frame = DataFrame::new(vec![
            dates("Boutique", &[Some("A")]),
            Series::new("Quantite".into(), &[1i64]).into(),
        ])
        .unwrap();
        let before = frame.clone();
        let used = derive_time_features(&mut frame).unwrap();
        assert_eq!(used, None);
        assert!(frame.equals(&before));
    }

    #[test]
    fn first_matching_column_wins() {
        let mut frame = DataFrame::new(vec![
            dates("date_livraison", &[Some("2024-01-02")]),
            dates("Date_Creation", &[Some("2024-05-06")]),
        ])
        .unwrap();
        let used = derive_time_features(&mut frame).unwrap();
        assert_eq!(used.as_deref(), Some("date_livraison"));
        assert!(column_names(&frame).contains(&"Date_Creation".to_string()));
        assert_eq!(ints(&frame, "month"), vec![1]);
    }
}
