//! # Meridian Fiscal Year Calculator
//!
//! Maps calendar dates to fiscal years and accumulates year-to-date windows.
//!
//! The fiscal year starts in April and is named after the calendar year it
//! ends in: 2025-04-01 opens FY2026, 2026-03-31 closes it. Year-to-date for
//! a target month accumulates every month from that April through the target
//! month inclusive, with ratios recomputed from the accumulated sums.

pub mod error;

pub use error::FiscalError;

use chrono::{Datelike, NaiveDate};
use core_types::{ChannelType, MonthlyMetric};
use metrics::MetricCalculator;
use tracing::debug;

/// The fiscal year a calendar date belongs to.
///
/// April and later belong to the following calendar year's fiscal year;
/// January through March close out the current one.
pub fn fiscal_year(date: NaiveDate) -> i32 {
    fiscal_year_of(date.year(), date.month())
}

/// The fiscal year a (calendar year, month) pair belongs to.
pub fn fiscal_year_of(year: i32, month: u32) -> i32 {
    if month >= 4 { year + 1 } else { year }
}

/// The fiscal quarter of a calendar month: Apr-Jun = Q1, Jul-Sep = Q2,
/// Oct-Dec = Q3, Jan-Mar = Q4.
pub fn fiscal_quarter(month: u32) -> u32 {
    match month {
        4..=6 => 1,
        7..=9 => 2,
        10..=12 => 3,
        _ => 4,
    }
}

/// Short fiscal-year label, e.g. `FY26` for fiscal year 2026.
pub fn fiscal_year_label(fy: i32) -> String {
    format!("FY{:02}", fy.rem_euclid(100))
}

/// Full fiscal period label for a calendar (year, month), e.g. `FY26-Q1-04`
/// for April 2025.
pub fn fiscal_period_label(year: i32, month: u32) -> String {
    format!(
        "{}-Q{}-{:02}",
        fiscal_year_label(fiscal_year_of(year, month)),
        fiscal_quarter(month),
        month
    )
}

/// Annotates monthly results with their fiscal year and accumulates
/// year-to-date windows.
#[derive(Debug, Default)]
pub struct FiscalYearCalculator {
    calculator: MetricCalculator,
}

impl FiscalYearCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps the fiscal year on every entry.
    pub fn annotate(&self, monthly: &mut [MonthlyMetric]) {
        for metric in monthly.iter_mut() {
            metric.fiscal_year = Some(fiscal_year_of(metric.year, metric.month));
        }
    }

    /// The sequence of calendar (year, month) pairs a year-to-date window
    /// covers: April of the fiscal year's start through the target month,
    /// inclusive. The target must itself lie inside the fiscal year.
    pub fn ytd_window(
        &self,
        fy: i32,
        through_year: i32,
        through_month: u32,
    ) -> Result<Vec<(i32, u32)>, FiscalError> {
        if !(1..=12).contains(&through_month) {
            return Err(FiscalError::InvalidMonth(through_month));
        }
        if fiscal_year_of(through_year, through_month) != fy {
            return Err(FiscalError::OutsideFiscalYear {
                fiscal_year: fy,
                year: through_year,
                month: through_month,
            });
        }

        let mut window = Vec::new();
        let (mut year, mut month) = (fy - 1, 4);
        loop {
            window.push((year, month));
            if (year, month) == (through_year, through_month) {
                break;
            }
            month += 1;
            if month > 12 {
                month = 1;
                year += 1;
            }
        }
        Ok(window)
    }

    /// Accumulates one channel's monthly results across a year-to-date
    /// window: sums the summable fields of every window month present in
    /// `monthly`, then recomputes every ratio from the accumulated sums.
    ///
    /// Returns `Ok(None)` when no window month has data for the channel.
    /// The result is stamped with the target period and the fiscal year.
    pub fn accumulate_ytd(
        &self,
        monthly: &[MonthlyMetric],
        channel: ChannelType,
        fy: i32,
        through_year: i32,
        through_month: u32,
    ) -> Result<Option<MonthlyMetric>, FiscalError> {
        let window = self.ytd_window(fy, through_year, through_month)?;

        let mut ytd = MonthlyMetric::new(through_year, through_month, channel);
        ytd.fiscal_year = Some(fy);
        let mut contributed = 0usize;

        for &(year, month) in &window {
            let Some(entry) = monthly
                .iter()
                .find(|m| m.channel == channel && m.year == year && m.month == month)
            else {
                continue;
            };
            ytd.gmv += entry.gmv;
            ytd.net += entry.net;
            ytd.cancel_amount += entry.cancel_amount;
            ytd.return_amount += entry.return_amount;
            ytd.gmv_units += entry.gmv_units;
            ytd.net_units += entry.net_units;
            ytd.uv += entry.uv;
            ytd.buyers += entry.buyers;
            ytd.orders += entry.orders;
            ytd.paid_traffic += entry.paid_traffic;
            ytd.free_traffic += entry.free_traffic;
            ytd.day_count += entry.day_count;
            contributed += 1;
        }

        if contributed == 0 {
            return Ok(None);
        }

        self.calculator.recompute(&mut ytd);
        debug!(
            fiscal_year = fy,
            through = %ytd.period(),
            channel = %channel,
            months = contributed,
            "accumulated year-to-date"
        );
        Ok(Some(ytd))
    }
}
