use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::date_range::DateRange;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

/// Expands grouped per-day counts into one entry per calendar day of the
/// range, ascending, with zero counts for days the query returned no row.
pub fn fill_daily_gaps(range: &DateRange, rows: &[(NaiveDate, i64)]) -> Vec<DailyCount> {
    let counts: HashMap<NaiveDate, i64> = rows.iter().copied().collect();
    range
        .days()
        .map(|date| DailyCount {
            date,
            count: counts.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fills_missing_days_with_zero() {
        let range = DateRange::new(day(2020, 2, 2), day(2020, 2, 4)).unwrap();
        let rows = vec![(day(2020, 2, 2), 3), (day(2020, 2, 4), 1)];
        let breakdown = fill_daily_gaps(&range, &rows);
        assert_eq!(
            breakdown,
            vec![
                DailyCount { date: day(2020, 2, 2), count: 3 },
                DailyCount { date: day(2020, 2, 3), count: 0 },
                DailyCount { date: day(2020, 2, 4), count: 1 },
            ]
        );
    }

    #[test]
    fn entry_count_matches_range_length() {
        let range = DateRange::new(day(2024, 1, 1), day(2024, 1, 31)).unwrap();
        let breakdown = fill_daily_gaps(&range, &[]);
        assert_eq!(breakdown.len() as i64, range.num_days());
        assert!(breakdown.iter().all(|entry| entry.count == 0));
    }

    #[test]
    fn ignores_rows_outside_range() {
        let range = DateRange::new(day(2020, 2, 2), day(2020, 2, 2)).unwrap();
        let rows = vec![(day(2020, 2, 1), 7), (day(2020, 2, 2), 2)];
        let breakdown = fill_daily_gaps(&range, &rows);
        assert_eq!(breakdown, vec![DailyCount { date: day(2020, 2, 2), count: 2 }]);
    }
}
