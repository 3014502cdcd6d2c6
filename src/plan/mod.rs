//! Date-range planning
//!
//! A run is just an ordered sequence of calendar days. This module computes
//! that sequence from the run mode, the persisted checkpoint, and the
//! invocation date, as a lazy finite iterator consumed exactly once.
//!
//! The checkpoint marks the last *completed* date and is an exclusive
//! boundary: the planner never re-emits it.

use chrono::{Datelike, NaiveDate};

/// Determines the direction and bounds of date iteration for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// All dates of one month, ascending
    Monthly { year: i32, month: u32 },

    /// Strictly older than the checkpoint, descending toward the earliest
    /// archived date
    CheckpointBackward,

    /// Strictly newer than the checkpoint, ascending toward today
    CheckpointForward,

    /// Inclusive range; direction inferred from the endpoints
    ExplicitRange { start: NaiveDate, end: NaiveDate },
}

/// Lazy, finite, non-restartable sequence of dates for one run
#[derive(Debug)]
pub struct DatePlan {
    next: Option<NaiveDate>,
    end: NaiveDate,
    descending: bool,
}

impl Iterator for DatePlan {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next?;
        if self.descending {
            if current < self.end {
                self.next = None;
                return None;
            }
            self.next = current.pred_opt();
        } else {
            if current > self.end {
                self.next = None;
                return None;
            }
            self.next = current.succ_opt();
        }
        Some(current)
    }
}

/// Computes the ordered sequence of dates to visit.
///
/// `checkpoint` is the last fully-completed date for the stream (absent on a
/// first-ever run, in which case the checkpoint modes start at `today`).
/// `earliest` bounds backward iteration at the oldest date the archive
/// covers.
pub fn plan_dates(
    mode: RunMode,
    checkpoint: Option<NaiveDate>,
    today: NaiveDate,
    earliest: NaiveDate,
) -> DatePlan {
    match mode {
        RunMode::Monthly { year, month } => {
            let first = NaiveDate::from_ymd_opt(year, month, 1);
            let next_month_first = if month == 12 {
                NaiveDate::from_ymd_opt(year + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(year, month + 1, 1)
            };
            let end = next_month_first.and_then(|d| d.pred_opt());
            match (first, end) {
                (Some(first), Some(end)) => DatePlan {
                    next: Some(first),
                    end,
                    descending: false,
                },
                // Invalid month: empty plan.
                _ => DatePlan {
                    next: None,
                    end: today,
                    descending: false,
                },
            }
        }

        RunMode::CheckpointBackward => {
            let start = match checkpoint {
                Some(cp) => cp.pred_opt(),
                None => Some(today),
            };
            DatePlan {
                next: start,
                end: earliest,
                descending: true,
            }
        }

        RunMode::CheckpointForward => {
            let start = match checkpoint {
                Some(cp) => cp.succ_opt(),
                None => Some(today),
            };
            DatePlan {
                next: start,
                end: today,
                descending: false,
            }
        }

        RunMode::ExplicitRange { start, end } => DatePlan {
            next: Some(start),
            end,
            descending: start > end,
        },
    }
}

/// Returns the (year, month) of the month prior to `today`.
///
/// Used by the scheduled monthly invocation, which always targets the most
/// recently completed month.
pub fn previous_month(today: NaiveDate) -> (i32, u32) {
    if today.month() == 1 {
        (today.year() - 1, 12)
    } else {
        (today.year(), today.month() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn earliest() -> NaiveDate {
        d(2007, 6, 2)
    }

    #[test]
    fn test_monthly_plans_whole_month_ascending() {
        let dates: Vec<_> = plan_dates(
            RunMode::Monthly {
                year: 2026,
                month: 2,
            },
            None,
            d(2026, 3, 3),
            earliest(),
        )
        .collect();

        assert_eq!(dates.len(), 28);
        assert_eq!(dates[0], d(2026, 2, 1));
        assert_eq!(dates[27], d(2026, 2, 28));
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_monthly_handles_december() {
        let dates: Vec<_> = plan_dates(
            RunMode::Monthly {
                year: 2025,
                month: 12,
            },
            None,
            d(2026, 1, 2),
            earliest(),
        )
        .collect();
        assert_eq!(dates.len(), 31);
        assert_eq!(dates[30], d(2025, 12, 31));
    }

    #[test]
    fn test_backward_starts_day_before_checkpoint() {
        let mut plan = plan_dates(
            RunMode::CheckpointBackward,
            Some(d(2026, 1, 15)),
            d(2026, 2, 1),
            earliest(),
        );
        assert_eq!(plan.next(), Some(d(2026, 1, 14)));
        assert_eq!(plan.next(), Some(d(2026, 1, 13)));
    }

    #[test]
    fn test_backward_stops_at_earliest() {
        let dates: Vec<_> = plan_dates(
            RunMode::CheckpointBackward,
            Some(d(2007, 6, 4)),
            d(2026, 1, 1),
            earliest(),
        )
        .collect();
        assert_eq!(dates, vec![d(2007, 6, 3), d(2007, 6, 2)]);
    }

    #[test]
    fn test_backward_without_checkpoint_starts_today() {
        let mut plan = plan_dates(
            RunMode::CheckpointBackward,
            None,
            d(2026, 1, 10),
            earliest(),
        );
        assert_eq!(plan.next(), Some(d(2026, 1, 10)));
    }

    #[test]
    fn test_forward_starts_day_after_checkpoint() {
        let dates: Vec<_> = plan_dates(
            RunMode::CheckpointForward,
            Some(d(2026, 1, 28)),
            d(2026, 1, 31),
            earliest(),
        )
        .collect();
        assert_eq!(dates, vec![d(2026, 1, 29), d(2026, 1, 30), d(2026, 1, 31)]);
    }

    #[test]
    fn test_forward_caught_up_is_empty() {
        let dates: Vec<_> = plan_dates(
            RunMode::CheckpointForward,
            Some(d(2026, 1, 31)),
            d(2026, 1, 31),
            earliest(),
        )
        .collect();
        assert!(dates.is_empty());
    }

    #[test]
    fn test_forward_without_checkpoint_is_just_today() {
        let dates: Vec<_> = plan_dates(
            RunMode::CheckpointForward,
            None,
            d(2026, 1, 31),
            earliest(),
        )
        .collect();
        assert_eq!(dates, vec![d(2026, 1, 31)]);
    }

    #[test]
    fn test_explicit_range_ascending() {
        let dates: Vec<_> = plan_dates(
            RunMode::ExplicitRange {
                start: d(2026, 1, 1),
                end: d(2026, 1, 3),
            },
            None,
            d(2026, 6, 1),
            earliest(),
        )
        .collect();
        assert_eq!(dates, vec![d(2026, 1, 1), d(2026, 1, 2), d(2026, 1, 3)]);
    }

    #[test]
    fn test_explicit_range_descending() {
        let dates: Vec<_> = plan_dates(
            RunMode::ExplicitRange {
                start: d(2026, 1, 3),
                end: d(2026, 1, 1),
            },
            None,
            d(2026, 6, 1),
            earliest(),
        )
        .collect();
        assert_eq!(dates, vec![d(2026, 1, 3), d(2026, 1, 2), d(2026, 1, 1)]);
    }

    #[test]
    fn test_explicit_range_single_date() {
        let dates: Vec<_> = plan_dates(
            RunMode::ExplicitRange {
                start: d(2026, 1, 1),
                end: d(2026, 1, 1),
            },
            None,
            d(2026, 6, 1),
            earliest(),
        )
        .collect();
        assert_eq!(dates, vec![d(2026, 1, 1)]);
    }

    #[test]
    fn test_checkpoint_itself_is_never_emitted() {
        let cp = d(2026, 1, 15);
        let backward: Vec<_> = plan_dates(
            RunMode::CheckpointBackward,
            Some(cp),
            d(2026, 2, 1),
            d(2026, 1, 1),
        )
        .collect();
        let forward: Vec<_> = plan_dates(
            RunMode::CheckpointForward,
            Some(cp),
            d(2026, 2, 1),
            earliest(),
        )
        .collect();
        assert!(!backward.contains(&cp));
        assert!(!forward.contains(&cp));
    }

    #[test]
    fn test_previous_month_rolls_over_year() {
        assert_eq!(previous_month(d(2026, 3, 3)), (2026, 2));
        assert_eq!(previous_month(d(2026, 1, 15)), (2025, 12));
    }
}
