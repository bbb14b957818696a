use chrono::NaiveDate;

use crate::error::CoreError;

/// Inclusive calendar-day range. Construction enforces `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, CoreError> {
        if start > end {
            return Err(CoreError::InvalidDateRange(format!(
                "{start} is after {end}"
            )));
        }
        Ok(DateRange { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        std::iter::successors(Some(self.start), |day| day.succ_opt())
            .take_while(move |day| *day <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn single_day_range() {
        let range = DateRange::new(day(2020, 2, 2), day(2020, 2, 2)).unwrap();
        assert_eq!(range.num_days(), 1);
        assert_eq!(range.days().collect::<Vec<_>>(), vec![day(2020, 2, 2)]);
    }

    #[test]
    fn days_cover_inclusive_range() {
        let range = DateRange::new(day(2020, 2, 2), day(2020, 2, 4)).unwrap();
        assert_eq!(range.num_days(), 3);
        assert_eq!(
            range.days().collect::<Vec<_>>(),
            vec![day(2020, 2, 2), day(2020, 2, 3), day(2020, 2, 4)]
        );
    }

    #[test]
    fn days_cross_month_boundary() {
        let range = DateRange::new(day(2020, 1, 31), day(2020, 2, 1)).unwrap();
        assert_eq!(
            range.days().collect::<Vec<_>>(),
            vec![day(2020, 1, 31), day(2020, 2, 1)]
        );
    }

    #[test]
    fn reject_inverted_range() {
        assert!(DateRange::new(day(2021, 1, 1), day(2020, 1, 1)).is_err());
    }
}
