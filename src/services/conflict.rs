use chrono::NaiveDate;

use crate::errors::AppError;
use crate::models::Booking;
use crate::services::dates::ranges_overlap;

#[derive(Debug, Clone, PartialEq)]
pub enum ConflictCheck {
    Admit,
    Reject { conflicting_ids: Vec<String> },
}

impl ConflictCheck {
    pub fn is_admit(&self) -> bool {
        matches!(self, ConflictCheck::Admit)
    }

    /// Turn a rejection into the error the lifecycle reports.
    pub fn into_result(self, on_approval: bool) -> Result<(), AppError> {
        match self {
            ConflictCheck::Admit => Ok(()),
            ConflictCheck::Reject { conflicting_ids } => Err(AppError::Conflict {
                ids: conflicting_ids,
                on_approval,
            }),
        }
    }
}

/// Decide whether `[start, end]` can be admitted next to `existing`.
///
/// Only occupying bookings count; anything else in `existing` is ignored, as
/// is the booking named by `exclude` (the one being re-validated during
/// approval). Every overlapping booking is reported, in input order.
pub fn check_conflict(
    start: NaiveDate,
    end: NaiveDate,
    existing: &[Booking],
    exclude: Option<&str>,
) -> Result<ConflictCheck, AppError> {
    if end < start {
        return Err(AppError::InvalidRange);
    }

    let conflicting_ids: Vec<String> = existing
        .iter()
        .filter(|b| b.is_occupying())
        .filter(|b| exclude != Some(b.id.as_str()))
        .filter(|b| ranges_overlap(start, end, b.start_date, b.end_date))
        .map(|b| b.id.clone())
        .collect();

    if conflicting_ids.is_empty() {
        Ok(ConflictCheck::Admit)
    } else {
        Ok(ConflictCheck::Reject { conflicting_ids })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStatus;
    use crate::services::test_support::booking;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_admit_when_empty() {
        let result = check_conflict(d("2024-03-01"), d("2024-03-05"), &[], None).unwrap();
        assert_eq!(result, ConflictCheck::Admit);
    }

    #[test]
    fn test_reject_overlap() {
        let existing = vec![booking("a", "2024-03-01", "2024-03-05", BookingStatus::Approved)];
        let result = check_conflict(d("2024-03-04"), d("2024-03-08"), &existing, None).unwrap();
        assert_eq!(
            result,
            ConflictCheck::Reject {
                conflicting_ids: vec!["a".to_string()]
            }
        );
    }

    #[test]
    fn test_same_day_handover_conflicts() {
        let existing = vec![booking("a", "2024-03-01", "2024-03-05", BookingStatus::Approved)];
        let result = check_conflict(d("2024-03-05"), d("2024-03-06"), &existing, None).unwrap();
        assert!(!result.is_admit());
    }

    #[test]
    fn test_next_day_is_free() {
        let existing = vec![booking("a", "2024-03-01", "2024-03-05", BookingStatus::Approved)];
        let result = check_conflict(d("2024-03-06"), d("2024-03-08"), &existing, None).unwrap();
        assert!(result.is_admit());
    }

    #[test]
    fn test_collects_all_conflicts() {
        let existing = vec![
            booking("a", "2024-03-01", "2024-03-02", BookingStatus::Approved),
            booking("b", "2024-03-10", "2024-03-12", BookingStatus::Approved),
            booking("c", "2024-03-20", "2024-03-22", BookingStatus::Approved),
        ];
        let result = check_conflict(d("2024-03-02"), d("2024-03-10"), &existing, None).unwrap();
        assert_eq!(
            result,
            ConflictCheck::Reject {
                conflicting_ids: vec!["a".to_string(), "b".to_string()]
            }
        );
    }

    #[test]
    fn test_excludes_self() {
        let existing = vec![booking("a", "2024-03-01", "2024-03-05", BookingStatus::Approved)];
        let result = check_conflict(d("2024-03-01"), d("2024-03-05"), &existing, Some("a")).unwrap();
        assert!(result.is_admit());
    }

    #[test]
    fn test_ignores_non_occupying() {
        let existing = vec![
            booking("a", "2024-03-01", "2024-03-05", BookingStatus::Pending),
            booking("b", "2024-03-01", "2024-03-05", BookingStatus::Rejected),
        ];
        let result = check_conflict(d("2024-03-01"), d("2024-03-05"), &existing, None).unwrap();
        assert!(result.is_admit());
    }

    #[test]
    fn test_inverted_candidate() {
        assert!(matches!(
            check_conflict(d("2024-03-05"), d("2024-03-01"), &[], None),
            Err(AppError::InvalidRange)
        ));
    }

    #[test]
    fn test_into_result() {
        let reject = ConflictCheck::Reject {
            conflicting_ids: vec!["a".to_string()],
        };
        match reject.into_result(true) {
            Err(AppError::Conflict { ids, on_approval }) => {
                assert_eq!(ids, vec!["a".to_string()]);
                assert!(on_approval);
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert!(ConflictCheck::Admit.into_result(false).is_ok());
    }
}
