use chrono::NaiveDate;

use crate::errors::AppError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an ISO calendar date (`YYYY-MM-DD`). No time or zone component is
/// accepted, so a date can never shift by a day on its way in.
pub fn parse_date(field: &str, s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| AppError::Validation(format!("{field} must be a YYYY-MM-DD date, got {s:?}")))
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Every date from `start` to `end`, both inclusive, ascending.
pub fn dates_in_range(start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>, AppError> {
    if end < start {
        return Err(AppError::InvalidRange);
    }
    Ok(start.iter_days().take_while(|d| *d <= end).collect())
}

/// Closed-interval intersection. Sharing a single day counts as overlap.
pub fn ranges_overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// Inclusive length of a range in days.
pub fn duration_days(start: NaiveDate, end: NaiveDate) -> Result<i64, AppError> {
    if end < start {
        return Err(AppError::InvalidRange);
    }
    Ok((end - start).num_days() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_dates_in_range_inclusive() {
        let dates = dates_in_range(d("2024-03-01"), d("2024-03-03")).unwrap();
        assert_eq!(dates, vec![d("2024-03-01"), d("2024-03-02"), d("2024-03-03")]);
    }

    #[test]
    fn test_dates_in_range_single_day() {
        let dates = dates_in_range(d("2024-03-01"), d("2024-03-01")).unwrap();
        assert_eq!(dates, vec![d("2024-03-01")]);
    }

    #[test]
    fn test_dates_in_range_length_and_order() {
        let start = d("2024-02-20");
        let end = d("2024-03-10");
        let dates = dates_in_range(start, end).unwrap();
        assert_eq!(dates.len() as i64, (end - start).num_days() + 1);
        for pair in dates.windows(2) {
            assert_eq!(pair[1] - pair[0], chrono::Duration::days(1));
        }
        assert_eq!(dates.first(), Some(&start));
        assert_eq!(dates.last(), Some(&end));
    }

    #[test]
    fn test_dates_in_range_crosses_leap_day() {
        let dates = dates_in_range(d("2024-02-28"), d("2024-03-01")).unwrap();
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[1], d("2024-02-29"));
    }

    #[test]
    fn test_dates_in_range_rejects_inverted() {
        assert!(matches!(
            dates_in_range(d("2024-03-05"), d("2024-03-01")),
            Err(AppError::InvalidRange)
        ));
    }

    #[test]
    fn test_overlap_identical() {
        assert!(ranges_overlap(d("2024-03-01"), d("2024-03-05"), d("2024-03-01"), d("2024-03-05")));
    }

    #[test]
    fn test_overlap_touching_single_day() {
        assert!(ranges_overlap(d("2024-03-01"), d("2024-03-05"), d("2024-03-05"), d("2024-03-08")));
        assert!(ranges_overlap(d("2024-03-05"), d("2024-03-05"), d("2024-03-05"), d("2024-03-05")));
    }

    #[test]
    fn test_no_overlap_with_free_day_between() {
        assert!(!ranges_overlap(d("2024-03-01"), d("2024-03-05"), d("2024-03-07"), d("2024-03-08")));
    }

    #[test]
    fn test_no_overlap_back_to_back_days() {
        assert!(!ranges_overlap(d("2024-03-01"), d("2024-03-05"), d("2024-03-06"), d("2024-03-08")));
    }

    #[test]
    fn test_overlap_containment() {
        assert!(ranges_overlap(d("2024-03-01"), d("2024-03-31"), d("2024-03-10"), d("2024-03-12")));
    }

    #[test]
    fn test_overlap_symmetric() {
        let ranges = [
            (d("2024-03-01"), d("2024-03-05")),
            (d("2024-03-05"), d("2024-03-06")),
            (d("2024-03-07"), d("2024-03-07")),
            (d("2024-02-01"), d("2024-04-01")),
        ];
        for (a_start, a_end) in ranges {
            for (b_start, b_end) in ranges {
                assert_eq!(
                    ranges_overlap(a_start, a_end, b_start, b_end),
                    ranges_overlap(b_start, b_end, a_start, a_end)
                );
            }
        }
    }

    #[test]
    fn test_duration_days() {
        assert_eq!(duration_days(d("2024-03-01"), d("2024-03-05")).unwrap(), 5);
        assert_eq!(duration_days(d("2024-03-01"), d("2024-03-01")).unwrap(), 1);
        assert!(duration_days(d("2024-03-02"), d("2024-03-01")).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("start_date", " 2024-03-01 ").unwrap(), d("2024-03-01"));
        assert!(matches!(
            parse_date("start_date", "2024-03-01T00:00:00Z"),
            Err(AppError::Validation(_))
        ));
        assert!(parse_date("end_date", "03/01/2024").is_err());
        assert_eq!(format_date(&d("2024-03-01")), "2024-03-01");
    }
}
