//! ISO-week roll-up of daily rate rows

use crate::{PreparedRow, VariationKey, round3};
use chrono::{Datelike, Days, NaiveDate};
use std::collections::BTreeMap;

/// Monday of the ISO-8601 week containing `date`
pub fn iso_week_start(date: NaiveDate) -> NaiveDate {
    let offset = date.weekday().num_days_from_monday();
    date - Days::new(u64::from(offset))
}

/// Running totals for one week
#[derive(Debug, Default)]
struct WeekBucket {
    days: usize,
    sums: BTreeMap<VariationKey, f64>,
}

impl WeekBucket {
    fn add(&mut self, row: &PreparedRow) {
        self.days += 1;
        for (key, rate) in &row.rates {
            *self.sums.entry(key.clone()).or_insert(0.0) += rate;
        }
    }

    fn into_row(self, week_start: NaiveDate) -> PreparedRow {
        let days = self.days as f64;
        PreparedRow {
            date: week_start,
            rates: self
                .sums
                .into_iter()
                .map(|(key, sum)| (key, round3(sum / days)))
                .collect(),
        }
    }
}

/// Average daily rates per ISO week.
///
/// Rows are summed in date order so the result does not depend on the input
/// order; output is ascending by week start. Weeks without any daily row are
/// not emitted.
pub fn aggregate_by_week(daily: &[PreparedRow]) -> Vec<PreparedRow> {
    let mut ordered: Vec<&PreparedRow> = daily.iter().collect();
    ordered.sort_by_key(|row| row.date);

    let mut weeks: BTreeMap<NaiveDate, WeekBucket> = BTreeMap::new();
    for row in ordered {
        weeks.entry(iso_week_start(row.date)).or_default().add(row);
    }

    let weekly: Vec<PreparedRow> = weeks
        .into_iter()
        .map(|(week_start, bucket)| bucket.into_row(week_start))
        .collect();
    tracing::debug!(days = daily.len(), weeks = weekly.len(), "weekly rates aggregated");
    weekly
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_week_start() {
        // 2024-01-03 is a Wednesday
        assert_eq!(iso_week_start(date(2024, 1, 3)), date(2024, 1, 1));
        // Sunday belongs to the week that started the previous Monday
        assert_eq!(iso_week_start(date(2024, 1, 7)), date(2024, 1, 1));
        assert_eq!(iso_week_start(date(2024, 1, 8)), date(2024, 1, 8));
        // Week crossing a year boundary
        assert_eq!(iso_week_start(date(2021, 1, 1)), date(2020, 12, 28));
    }

    #[test]
    fn test_single_day_week_keeps_value() {
        let daily = vec![PreparedRow::new(date(2024, 1, 10)).with_rate("1", 4.321)];
        let weekly = aggregate_by_week(&daily);
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].date, date(2024, 1, 8));
        assert_eq!(weekly[0].rate(&"1".into()), Some(4.321));
    }

    #[test]
    fn test_average_of_three_days() {
        let daily = vec![
            PreparedRow::new(date(2024, 1, 1)).with_rate("1", 10.0),
            PreparedRow::new(date(2024, 1, 2)).with_rate("1", 20.0),
            PreparedRow::new(date(2024, 1, 3)).with_rate("1", 30.0),
        ];
        let weekly = aggregate_by_week(&daily);
        assert_eq!(weekly.len(), 1);
        assert_eq!(weekly[0].rate(&"1".into()), Some(20.0));
    }

    #[test]
    fn test_output_sorted_for_unsorted_input() {
        let daily = vec![
            PreparedRow::new(date(2024, 1, 22)).with_rate("1", 1.0),
            PreparedRow::new(date(2024, 1, 2)).with_rate("1", 2.0),
            PreparedRow::new(date(2024, 1, 16)).with_rate("1", 3.0),
            PreparedRow::new(date(2024, 1, 3)).with_rate("1", 4.0),
        ];
        let weekly = aggregate_by_week(&daily);
        let dates: Vec<_> = weekly.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 1), date(2024, 1, 15), date(2024, 1, 22)]);
        assert_eq!(weekly[0].rate(&"1".into()), Some(3.0));
    }

    #[test]
    fn test_gaps_produce_no_empty_weeks() {
        let daily = vec![
            PreparedRow::new(date(2024, 1, 1)).with_rate("1", 1.0),
            PreparedRow::new(date(2024, 2, 1)).with_rate("1", 1.0),
        ];
        assert_eq!(aggregate_by_week(&daily).len(), 2);
        assert!(aggregate_by_week(&[]).is_empty());
    }

    #[test]
    fn test_weekly_rounding() {
        let daily = vec![
            PreparedRow::new(date(2024, 1, 1)).with_rate("1", 1.0).with_rate("2", 0.0),
            PreparedRow::new(date(2024, 1, 2)).with_rate("1", 1.0).with_rate("2", 0.0),
            PreparedRow::new(date(2024, 1, 3)).with_rate("1", 2.0).with_rate("2", 1.0),
        ];
        let weekly = aggregate_by_week(&daily);
        assert_eq!(weekly[0].rate(&"1".into()), Some(1.333));
        assert_eq!(weekly[0].rate(&"2".into()), Some(0.333));
    }
}
