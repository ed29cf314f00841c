//! # Meridian Growth Calculator
//!
//! Annotates a series of monthly results with year-over-year and
//! month-over-month growth rates, independently per metric field.
//!
//! A growth value is undefined whenever the comparison period is missing
//! from the series, or the comparison value is itself undefined or zero.
//! Undefined growth is simply absent from the annotation map; it is never a
//! divide-by-zero error and never coerced to `0%`. Missing months are never
//! inferred by interpolation.

use core_types::{ChannelType, Metric, MonthlyMetric};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

/// A stateless calculator for period-over-period growth rates.
#[derive(Debug, Default)]
pub struct GrowthCalculator {}

impl GrowthCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(current - base) / base x 100`, undefined when either side is
    /// undefined or the base is zero.
    pub fn growth_rate(&self, current: Option<Decimal>, base: Option<Decimal>) -> Option<Decimal> {
        let current = current?;
        let base = base?;
        if base.is_zero() {
            return None;
        }
        Some((current - base) / base * Decimal::ONE_HUNDRED)
    }

    /// Fills the `yoy` and `mom` maps of every entry in `monthly`, comparing
    /// each (channel, year, month) against the same channel one year and one
    /// month earlier. Entries may arrive for several channels at once; each
    /// channel forms its own series.
    pub fn annotate(&self, monthly: &mut [MonthlyMetric]) {
        // Snapshot the pre-annotation values so enrichment order cannot
        // influence the result.
        let snapshot: BTreeMap<(ChannelType, i32, u32), MonthlyMetric> = monthly
            .iter()
            .map(|m| ((m.channel, m.year, m.month), m.clone()))
            .collect();

        for metric in monthly.iter_mut() {
            let yoy_base = snapshot.get(&(metric.channel, metric.year - 1, metric.month));
            let mom_key = previous_month(metric.year, metric.month);
            let mom_base = snapshot.get(&(metric.channel, mom_key.0, mom_key.1));

            for field in Metric::ALL {
                if let Some(rate) =
                    self.growth_rate(metric.value(field), yoy_base.and_then(|b| b.value(field)))
                {
                    metric.yoy.insert(field, rate);
                }
                if let Some(rate) =
                    self.growth_rate(metric.value(field), mom_base.and_then(|b| b.value(field)))
                {
                    metric.mom.insert(field, rate);
                }
            }

            debug!(
                period = %metric.period(),
                channel = %metric.channel,
                yoy_fields = metric.yoy.len(),
                mom_fields = metric.mom.len(),
                "annotated growth"
            );
        }
    }
}

/// The calendar month immediately preceding (year, month).
fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn month(year: i32, month_num: u32, net: Decimal) -> MonthlyMetric {
        let mut m = MonthlyMetric::new(year, month_num, ChannelType::Total);
        m.net = net;
        m
    }

    #[test]
    fn yoy_and_mom_are_computed_against_the_right_periods() {
        let mut series = vec![
            month(2024, 6, dec!(1000)),
            month(2025, 5, dec!(1100)),
            month(2025, 6, dec!(1210)),
        ];
        GrowthCalculator::new().annotate(&mut series);

        let june_25 = &series[2];
        assert_eq!(june_25.yoy_growth(Metric::Net), Some(dec!(21)));
        assert_eq!(june_25.mom_growth(Metric::Net), Some(dec!(10)));

        // 2024-06 has no earlier data at all
        assert_eq!(series[0].yoy_growth(Metric::Net), None);
        assert_eq!(series[0].mom_growth(Metric::Net), None);
    }

    #[test]
    fn january_mom_crosses_the_year_boundary() {
        let mut series = vec![month(2024, 12, dec!(2000)), month(2025, 1, dec!(2100))];
        GrowthCalculator::new().annotate(&mut series);
        assert_eq!(series[1].mom_growth(Metric::Net), Some(dec!(5)));
    }

    #[test]
    fn zero_base_yields_undefined_growth() {
        let mut series = vec![month(2024, 6, dec!(0)), month(2025, 6, dec!(500))];
        GrowthCalculator::new().annotate(&mut series);
        assert_eq!(series[1].yoy_growth(Metric::Net), None);
    }

    #[test]
    fn undefined_ratio_propagates_into_undefined_growth() {
        // Zero orders both years: AOV is undefined, so its growth must be
        // undefined too, not 0%.
        let mut last = month(2024, 6, dec!(1000));
        last.gmv = dec!(1200);
        let mut current = month(2025, 6, dec!(1500));
        current.gmv = dec!(1700);

        let mut series = vec![last, current];
        GrowthCalculator::new().annotate(&mut series);

        assert_eq!(series[1].value(Metric::Aov), None);
        assert_eq!(series[1].yoy_growth(Metric::Aov), None);
        // Defined fields still get growth.
        assert!(series[1].yoy_growth(Metric::Gmv).is_some());
    }

    #[test]
    fn channels_form_independent_series() {
        let mut platform = month(2024, 6, dec!(1000));
        platform.channel = ChannelType::Platform;
        let mut series = vec![platform, month(2025, 6, dec!(3000))];
        GrowthCalculator::new().annotate(&mut series);

        // TOTAL 2025-06 must not compare against PLATFORM 2024-06.
        assert_eq!(series[1].yoy_growth(Metric::Net), None);
    }
}
