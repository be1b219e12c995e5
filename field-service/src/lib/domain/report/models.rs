use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Months;
use chrono::NaiveDate;
use chrono::NaiveTime;
use chrono::Utc;

use crate::domain::ids::WorkOrderId;
use crate::domain::report::errors::PeriodError;
use crate::domain::work_order::models::Priority;
use crate::domain::work_order::models::WorkOrderType;

/// Calendar month a report covers, parsed from `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    first_day: NaiveDate,
}

impl ReportPeriod {
    /// Inclusive start of the window, midnight UTC on the first day.
    pub fn start(&self) -> DateTime<Utc> {
        self.first_day.and_time(NaiveTime::MIN).and_utc()
    }

    /// Exclusive end of the window, midnight UTC on the first day of the next month.
    pub fn end(&self) -> DateTime<Utc> {
        self.next_month().and_time(NaiveTime::MIN).and_utc()
    }

    fn next_month(&self) -> NaiveDate {
        self.first_day
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX)
    }
}

impl FromStr for ReportPeriod {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PeriodError::Missing);
        }

        let (year, month) = s.split_once('-').ok_or(PeriodError::InvalidFormat)?;
        let all_digits = |part: &str, len: usize| {
            part.len() == len && part.bytes().all(|b| b.is_ascii_digit())
        };
        if !all_digits(year, 4) || !all_digits(month, 2) {
            return Err(PeriodError::InvalidFormat);
        }

        let year = year.parse::<i32>().map_err(|_| PeriodError::InvalidFormat)?;
        let month = month.parse::<u32>().map_err(|_| PeriodError::InvalidFormat)?;
        let first_day = NaiveDate::from_ymd_opt(year, month, 1).ok_or(PeriodError::InvalidFormat)?;

        Ok(Self { first_day })
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first_day.format("%Y-%m"))
    }
}

/// Names printed at the top of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeader {
    pub service_provider_name: String,
    pub customer_name: String,
}

/// One completed work order as it appears in a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub work_order_id: WorkOrderId,
    pub completed_at: DateTime<Utc>,
    pub site_name: String,
    pub asset_tag: String,
    pub asset_name: Option<String>,
    pub work_order_type: WorkOrderType,
    pub priority: Priority,
    pub title: String,
}

/// Already-authorized monthly report data, ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyReport {
    pub period: ReportPeriod,
    pub header: ReportHeader,
    pub entries: Vec<ReportEntry>,
}
