//! Calendar bucketing for budget reconciliation.
//!
//! Pure calendar arithmetic over the five supported granularities: bucket
//! bounds, canonical period labels, backward walking over historical periods
//! and parsing a label back to a representative date. A calendar day is the
//! finest instant the core distinguishes, so bucket bounds are inclusive
//! dates.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use model::period::TimeGranularity;
use tracing::instrument;

use crate::error::{ComputeError, Result};

/// Returns the last day of the given month.
fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .pred_opt()
        .unwrap()
}

/// First month of the quarter containing `month` (1, 4, 7 or 10).
fn quarter_start_month(month: u32) -> u32 {
    (month - 1) / 3 * 3 + 1
}

/// Computes the inclusive first and last day of the bucket containing `date`.
///
/// Weeks run Monday through Sunday. Quarters are the 3-month blocks starting
/// January, April, July and October; halves are January-June and
/// July-December. For every date, `start <= date <= end`, and the end of one
/// bucket is the day before the start of the next.
pub fn period_bounds(date: NaiveDate, granularity: TimeGranularity) -> (NaiveDate, NaiveDate) {
    match granularity {
        TimeGranularity::Weekly => {
            let start = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
            (start, start + Duration::days(6))
        }
        TimeGranularity::Monthly => {
            let start = date.with_day(1).unwrap();
            (start, last_day_of_month(date.year(), date.month()))
        }
        TimeGranularity::Quarterly => {
            let start_month = quarter_start_month(date.month());
            let start = NaiveDate::from_ymd_opt(date.year(), start_month, 1).unwrap();
            (start, last_day_of_month(date.year(), start_month + 2))
        }
        TimeGranularity::HalfYearly => {
            if date.month() <= 6 {
                (
                    NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap(),
                    NaiveDate::from_ymd_opt(date.year(), 6, 30).unwrap(),
                )
            } else {
                (
                    NaiveDate::from_ymd_opt(date.year(), 7, 1).unwrap(),
                    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap(),
                )
            }
        }
        TimeGranularity::Yearly => (
            NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap(),
        ),
    }
}

/// Canonical textual key of the bucket containing `date`.
///
/// Formats: `YYYY-Www` (ISO week), `YYYY-MM`, `YYYY-Qn`, `YYYY-Hn`, `YYYY`.
/// Two dates produce the same label iff they fall in the same bucket; weekly
/// labels use the ISO week-numbering year so the label stays consistent with
/// Monday-based bounds across year boundaries.
pub fn period_label(date: NaiveDate, granularity: TimeGranularity) -> String {
    match granularity {
        TimeGranularity::Weekly => {
            let iso = date.iso_week();
            format!("{:04}-W{:02}", iso.year(), iso.week())
        }
        TimeGranularity::Monthly => date.format("%Y-%m").to_string(),
        TimeGranularity::Quarterly => format!("{}-Q{}", date.year(), (date.month() - 1) / 3 + 1),
        TimeGranularity::HalfYearly => {
            format!("{}-H{}", date.year(), if date.month() <= 6 { 1 } else { 2 })
        }
        TimeGranularity::Yearly => date.format("%Y").to_string(),
    }
}

/// Returns a date inside the bucket immediately before the one containing
/// `date`: the day before the current bucket's start. The step is always
/// exactly one bucket, never more.
pub fn previous_period_date(date: NaiveDate, granularity: TimeGranularity) -> NaiveDate {
    let (start, _) = period_bounds(date, granularity);
    start.pred_opt().unwrap_or(start)
}

/// Walks backward from the bucket containing `end_date`, one bucket per step,
/// and collects period labels until `count` distinct labels exist. Labels are
/// returned oldest-first.
#[instrument]
pub fn periods_in_range(
    end_date: NaiveDate,
    granularity: TimeGranularity,
    count: usize,
) -> Vec<String> {
    let mut periods: Vec<String> = Vec::with_capacity(count);
    let mut current = end_date;
    while periods.len() < count {
        let label = period_label(current, granularity);
        if !periods.contains(&label) {
            // Prepend to keep the list in chronological order.
            periods.insert(0, label);
        }
        let previous = previous_period_date(current, granularity);
        if previous == current {
            // Start of the representable calendar; nothing older exists.
            break;
        }
        current = previous;
    }
    periods
}

/// Parses a period label back to a representative date inside its bucket: the
/// Monday of the ISO week, or the first day of the month/quarter/half/year.
///
/// Inverse of [`period_label`]: for any label `L` this calendar produces,
/// `period_label(parse_label(L, g), g) == L`.
pub fn parse_label(label: &str, granularity: TimeGranularity) -> Result<NaiveDate> {
    let invalid = || ComputeError::InvalidPeriodLabel {
        label: label.to_string(),
        granularity,
    };

    match granularity {
        TimeGranularity::Weekly => {
            let (year, week) = label.split_once("-W").ok_or_else(invalid)?;
            let year: i32 = year.parse().map_err(|_| invalid())?;
            let week: u32 = week.parse().map_err(|_| invalid())?;
            NaiveDate::from_isoywd_opt(year, week, Weekday::Mon).ok_or_else(invalid)
        }
        TimeGranularity::Monthly => {
            let (year, month) = label.split_once('-').ok_or_else(invalid)?;
            let year: i32 = year.parse().map_err(|_| invalid())?;
            let month: u32 = month.parse().map_err(|_| invalid())?;
            NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)
        }
        TimeGranularity::Quarterly => {
            let (year, quarter) = label.split_once("-Q").ok_or_else(invalid)?;
            let year: i32 = year.parse().map_err(|_| invalid())?;
            let quarter: u32 = quarter.parse().map_err(|_| invalid())?;
            if !(1..=4).contains(&quarter) {
                return Err(invalid());
            }
            NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1).ok_or_else(invalid)
        }
        TimeGranularity::HalfYearly => {
            let (year, half) = label.split_once("-H").ok_or_else(invalid)?;
            let year: i32 = year.parse().map_err(|_| invalid())?;
            let half: u32 = half.parse().map_err(|_| invalid())?;
            if !(1..=2).contains(&half) {
                return Err(invalid());
            }
            NaiveDate::from_ymd_opt(year, if half == 1 { 1 } else { 7 }, 1).ok_or_else(invalid)
        }
        TimeGranularity::Yearly => {
            let year: i32 = label.parse().map_err(|_| invalid())?;
            NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_GRANULARITIES: [TimeGranularity; 5] = [
        TimeGranularity::Weekly,
        TimeGranularity::Monthly,
        TimeGranularity::Quarterly,
        TimeGranularity::HalfYearly,
        TimeGranularity::Yearly,
    ];

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_period_bounds_contain_the_date() {
        let dates = [
            date(2024, 1, 1),
            date(2024, 2, 29),
            date(2024, 6, 30),
            date(2024, 7, 1),
            date(2024, 12, 31),
        ];
        for granularity in ALL_GRANULARITIES {
            for d in dates {
                let (start, end) = period_bounds(d, granularity);
                assert!(start <= d && d <= end, "{granularity}: {start} <= {d} <= {end}");
            }
        }
    }

    #[test]
    fn test_period_bounds_are_adjacent() {
        // The end of one bucket is the day before the start of the next.
        for granularity in ALL_GRANULARITIES {
            let (_, end) = period_bounds(date(2024, 5, 15), granularity);
            let (next_start, _) = period_bounds(end.succ_opt().unwrap(), granularity);
            assert_eq!(next_start, end.succ_opt().unwrap());
            assert_ne!(
                period_label(end, granularity),
                period_label(next_start, granularity)
            );
        }
    }

    #[test]
    fn test_weekly_bounds_run_monday_to_sunday() {
        // 2024-03-05 is a Tuesday.
        let (start, end) = period_bounds(date(2024, 3, 5), TimeGranularity::Weekly);
        assert_eq!(start, date(2024, 3, 4));
        assert_eq!(end, date(2024, 3, 10));
        assert_eq!(start.weekday(), Weekday::Mon);
        assert_eq!(end.weekday(), Weekday::Sun);
    }

    #[test]
    fn test_monthly_bounds_handle_leap_february() {
        let (start, end) = period_bounds(date(2024, 2, 10), TimeGranularity::Monthly);
        assert_eq!(start, date(2024, 2, 1));
        assert_eq!(end, date(2024, 2, 29));
    }

    #[test]
    fn test_quarter_and_half_bounds() {
        let (start, end) = period_bounds(date(2024, 5, 15), TimeGranularity::Quarterly);
        assert_eq!((start, end), (date(2024, 4, 1), date(2024, 6, 30)));

        let (start, end) = period_bounds(date(2024, 8, 2), TimeGranularity::HalfYearly);
        assert_eq!((start, end), (date(2024, 7, 1), date(2024, 12, 31)));
    }

    #[test]
    fn test_period_labels() {
        let d = date(2024, 3, 5);
        assert_eq!(period_label(d, TimeGranularity::Weekly), "2024-W10");
        assert_eq!(period_label(d, TimeGranularity::Monthly), "2024-03");
        assert_eq!(period_label(d, TimeGranularity::Quarterly), "2024-Q1");
        assert_eq!(period_label(d, TimeGranularity::HalfYearly), "2024-H1");
        assert_eq!(period_label(d, TimeGranularity::Yearly), "2024");
    }

    #[test]
    fn test_weekly_label_uses_iso_week_year_at_boundary() {
        // 2024-12-30 is the Monday of ISO week 1 of 2025.
        assert_eq!(
            period_label(date(2024, 12, 30), TimeGranularity::Weekly),
            "2025-W01"
        );
        // Same bucket as the Sunday that follows it.
        assert_eq!(
            period_label(date(2025, 1, 5), TimeGranularity::Weekly),
            "2025-W01"
        );
    }

    #[test]
    fn test_same_label_iff_same_bucket() {
        for granularity in ALL_GRANULARITIES {
            let d = date(2024, 5, 15);
            let (start, end) = period_bounds(d, granularity);
            assert_eq!(period_label(start, granularity), period_label(end, granularity));
            assert_ne!(
                period_label(start.pred_opt().unwrap(), granularity),
                period_label(d, granularity)
            );
        }
    }

    #[test]
    fn test_label_round_trip() {
        let dates = [
            date(2023, 1, 1),
            date(2024, 2, 29),
            date(2024, 12, 30),
            date(2025, 7, 4),
        ];
        for granularity in ALL_GRANULARITIES {
            for d in dates {
                let label = period_label(d, granularity);
                let parsed = parse_label(&label, granularity).unwrap();
                assert_eq!(
                    period_label(parsed, granularity),
                    label,
                    "round trip for {granularity}"
                );
            }
        }
    }

    #[test]
    fn test_parse_label_representative_dates() {
        assert_eq!(
            parse_label("2024-W10", TimeGranularity::Weekly).unwrap(),
            date(2024, 3, 4)
        );
        assert_eq!(
            parse_label("2024-03", TimeGranularity::Monthly).unwrap(),
            date(2024, 3, 1)
        );
        assert_eq!(
            parse_label("2024-Q3", TimeGranularity::Quarterly).unwrap(),
            date(2024, 7, 1)
        );
        assert_eq!(
            parse_label("2024-H2", TimeGranularity::HalfYearly).unwrap(),
            date(2024, 7, 1)
        );
        assert_eq!(
            parse_label("2024", TimeGranularity::Yearly).unwrap(),
            date(2024, 1, 1)
        );
    }

    #[test]
    fn test_parse_label_rejects_malformed_labels() {
        assert!(parse_label("2024-Q5", TimeGranularity::Quarterly).is_err());
        assert!(parse_label("2024-H3", TimeGranularity::HalfYearly).is_err());
        assert!(parse_label("2024-13", TimeGranularity::Monthly).is_err());
        assert!(parse_label("Q1-2024", TimeGranularity::Quarterly).is_err());
        assert!(parse_label("not-a-year", TimeGranularity::Yearly).is_err());
    }

    #[test]
    fn test_previous_period_steps_exactly_one_bucket() {
        let d = date(2024, 1, 15);
        assert_eq!(
            period_label(
                previous_period_date(d, TimeGranularity::Monthly),
                TimeGranularity::Monthly
            ),
            "2023-12"
        );
        assert_eq!(
            period_label(
                previous_period_date(d, TimeGranularity::Quarterly),
                TimeGranularity::Quarterly
            ),
            "2023-Q4"
        );
        assert_eq!(
            period_label(
                previous_period_date(d, TimeGranularity::HalfYearly),
                TimeGranularity::HalfYearly
            ),
            "2023-H2"
        );
    }

    #[test]
    fn test_periods_in_range_monthly() {
        let periods = periods_in_range(date(2024, 3, 5), TimeGranularity::Monthly, 4);
        assert_eq!(periods, vec!["2023-12", "2024-01", "2024-02", "2024-03"]);
    }

    #[test]
    fn test_periods_in_range_weekly_across_year_boundary() {
        let periods = periods_in_range(date(2025, 1, 8), TimeGranularity::Weekly, 3);
        assert_eq!(periods, vec!["2024-W52", "2025-W01", "2025-W02"]);
    }

    #[test]
    fn test_periods_in_range_collects_distinct_labels() {
        // Coarse granularities must keep walking until the requested number of
        // distinct labels exists, not stop after `count` steps.
        let periods = periods_in_range(date(2024, 6, 1), TimeGranularity::Yearly, 3);
        assert_eq!(periods, vec!["2022", "2023", "2024"]);

        let periods = periods_in_range(date(2024, 11, 20), TimeGranularity::HalfYearly, 4);
        assert_eq!(periods, vec!["2023-H1", "2023-H2", "2024-H1", "2024-H2"]);
    }

    #[test]
    fn test_periods_in_range_zero_count() {
        assert!(periods_in_range(date(2024, 6, 1), TimeGranularity::Monthly, 0).is_empty());
    }
}
