use crate::error::AppError;
use chrono::{Datelike, Days, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Granularity of the sales chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl SalesPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalesPeriod::Daily => "daily",
            SalesPeriod::Weekly => "weekly",
            SalesPeriod::Monthly => "monthly",
        }
    }

    /// Number of buckets in the lookback window, current bucket included
    pub fn bucket_count(&self) -> usize {
        match self {
            SalesPeriod::Daily => 30,
            SalesPeriod::Weekly => 12,
            SalesPeriod::Monthly => 12,
        }
    }

    /// First day of the bucket containing `date`.
    /// Weeks start on Sunday.
    pub fn bucket_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            SalesPeriod::Daily => date,
            SalesPeriod::Weekly => {
                let days_since_sunday = date.weekday().num_days_from_sunday();
                date - Days::new(days_since_sunday as u64)
            }
            SalesPeriod::Monthly => date.with_day(1).unwrap_or(date),
        }
    }

    /// First day of the bucket following the one starting at `start`
    pub fn next_bucket_start(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            SalesPeriod::Daily => start.checked_add_days(Days::new(1)),
            SalesPeriod::Weekly => start.checked_add_days(Days::new(7)),
            SalesPeriod::Monthly => start.checked_add_months(Months::new(1)),
        }
    }

    /// First day of the oldest bucket in the window ending with `today`'s bucket
    pub fn window_start(&self, today: NaiveDate) -> Option<NaiveDate> {
        let current = self.bucket_start(today);
        let back = (self.bucket_count() - 1) as u32;
        match self {
            SalesPeriod::Daily => current.checked_sub_days(Days::new(back as u64)),
            SalesPeriod::Weekly => current.checked_sub_days(Days::new(back as u64 * 7)),
            SalesPeriod::Monthly => current.checked_sub_months(Months::new(back)),
        }
    }

    /// Chart label of the bucket starting at `start`.
    ///
    /// - daily: `D/M`, e.g. `5/3`
    /// - weekly: `Week N Mon`, where N is the week of the month of `start`
    /// - monthly: `Mon`
    pub fn label(&self, start: NaiveDate) -> String {
        match self {
            SalesPeriod::Daily => format!("{}/{}", start.day(), start.month()),
            SalesPeriod::Weekly => {
                format!("Week {} {}", week_of_month(start), start.format("%b"))
            }
            SalesPeriod::Monthly => start.format("%b").to_string(),
        }
    }
}

impl fmt::Display for SalesPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SalesPeriod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(SalesPeriod::Daily),
            "weekly" => Ok(SalesPeriod::Weekly),
            "monthly" => Ok(SalesPeriod::Monthly),
            other => Err(AppError::BadRequest(format!(
                "Invalid period specified: {}",
                other
            ))),
        }
    }
}

/// `ceil((day + weekday of the 1st) / 7)` with Sunday = 0
pub fn week_of_month(date: NaiveDate) -> u32 {
    let first = date.with_day(1).unwrap_or(date);
    let offset = first.weekday().num_days_from_sunday();
    (date.day() + offset).div_ceil(7)
}
