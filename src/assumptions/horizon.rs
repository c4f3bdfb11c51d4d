//! Projection horizon: period length, period count and calendar labels

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Length of one simulation period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    #[default]
    Month,
    Quarter,
    Year,
}

impl Frequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            Frequency::Month => 12,
            Frequency::Quarter => 4,
            Frequency::Year => 1,
        }
    }

    pub fn months_per_period(self) -> u32 {
        12 / self.periods_per_year()
    }

    /// Completed whole years at the start of `period_index` (0-based).
    ///
    /// Annual raises, escalations and decay factors step once per completed year.
    pub fn years_elapsed(self, period_index: u32) -> u32 {
        period_index / self.periods_per_year()
    }
}

/// Number and length of projected periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Horizon {
    pub periods: u32,

    #[serde(default)]
    pub frequency: Frequency,

    /// Calendar date of period 0, used only for labels and date-based triggers
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

impl Horizon {
    pub fn monthly(periods: u32) -> Self {
        Self {
            periods,
            frequency: Frequency::Month,
            start_date: None,
        }
    }

    /// Display label for a period: `2025-03`, `2025-Q1`, `2025`, or `P3` without a start date
    pub fn label(&self, period_index: u32) -> String {
        let Some(start) = self.start_date else {
            return format!("P{}", period_index);
        };
        let offset = period_index.saturating_mul(self.frequency.months_per_period());
        let Some(date) = start.checked_add_months(Months::new(offset)) else {
            return format!("P{}", period_index);
        };
        match self.frequency {
            Frequency::Month => format!("{}-{:02}", date.year(), date.month()),
            Frequency::Quarter => format!("{}-Q{}", date.year(), (date.month() - 1) / 3 + 1),
            Frequency::Year => format!("{}", date.year()),
        }
    }

    /// 0-based index of the period containing `date`, or `None` if it precedes the start.
    ///
    /// Without a start date, `None` is returned as well.
    pub fn period_for_date(&self, date: NaiveDate) -> Option<u32> {
        let start = self.start_date?;
        let month_diff = (date.year() - start.year()) * 12 + date.month() as i32 - start.month() as i32;
        if month_diff < 0 {
            return None;
        }
        Some(month_diff as u32 / self.frequency.months_per_period())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_conversions() {
        assert_eq!(Frequency::Month.periods_per_year(), 12);
        assert_eq!(Frequency::Quarter.months_per_period(), 3);
        assert_eq!(Frequency::Year.months_per_period(), 12);
    }

    #[test]
    fn test_years_elapsed_steps_at_year_boundary() {
        assert_eq!(Frequency::Month.years_elapsed(0), 0);
        assert_eq!(Frequency::Month.years_elapsed(11), 0);
        assert_eq!(Frequency::Month.years_elapsed(12), 1);
        assert_eq!(Frequency::Quarter.years_elapsed(3), 0);
        assert_eq!(Frequency::Quarter.years_elapsed(4), 1);
        assert_eq!(Frequency::Year.years_elapsed(3), 3);
    }

    #[test]
    fn test_labels() {
        let start = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
        let monthly = Horizon { periods: 4, frequency: Frequency::Month, start_date: Some(start) };
        assert_eq!(monthly.label(0), "2025-11");
        assert_eq!(monthly.label(2), "2026-01");

        let quarterly = Horizon { periods: 4, frequency: Frequency::Quarter, start_date: Some(start) };
        assert_eq!(quarterly.label(0), "2025-Q4");
        assert_eq!(quarterly.label(1), "2026-Q1");

        let undated = Horizon::monthly(3);
        assert_eq!(undated.label(2), "P2");
    }

    #[test]
    fn test_period_for_date() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let quarterly = Horizon { periods: 8, frequency: Frequency::Quarter, start_date: Some(start) };

        assert_eq!(quarterly.period_for_date(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap()), Some(0));
        assert_eq!(quarterly.period_for_date(NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()), Some(1));
        assert_eq!(quarterly.period_for_date(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()), None);
        assert_eq!(Horizon::monthly(3).period_for_date(start), None);
    }
}
