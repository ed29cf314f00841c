use crate::enums::{ChannelType, Metric, SubChannel};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One named sub-channel's figures for a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubChannelSlice {
    pub net: Decimal,
    pub gmv: Decimal,
    pub traffic: u64,
    /// Spend is only tracked for paid sub-channels.
    #[serde(default)]
    pub spend: Option<Decimal>,
}

/// The direct-to-consumer channel's per-day sub-channel breakdown.
///
/// Each slice is optional: a day with no social activity simply carries no
/// social slice. Sub-channel sums must not exceed the parent DTC totals,
/// which is checked downstream by the validator rather than enforced here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DtcBreakdown {
    #[serde(default)]
    pub social: Option<SubChannelSlice>,
    #[serde(default)]
    pub employee: Option<SubChannelSlice>,
    #[serde(default)]
    pub advertising: Option<SubChannelSlice>,
    #[serde(default)]
    pub organic: Option<SubChannelSlice>,
}

impl DtcBreakdown {
    /// Returns the slice for the given sub-channel, if the day recorded one.
    pub fn slice(&self, sub: SubChannel) -> Option<&SubChannelSlice> {
        match sub {
            SubChannel::Social => self.social.as_ref(),
            SubChannel::Employee => self.employee.as_ref(),
            SubChannel::Advertising => self.advertising.as_ref(),
            SubChannel::Organic => self.organic.as_ref(),
        }
    }
}

/// One calendar date x one base channel, as delivered by the retrieval
/// collaborator. Field types and ranges are already validated upstream;
/// the core only re-checks cross-field business invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub channel: ChannelType,

    // Amounts
    #[serde(default)]
    pub gmv: Decimal,
    #[serde(default)]
    pub net: Decimal,
    #[serde(default)]
    pub cancel_amount: Decimal,
    #[serde(default)]
    pub return_amount: Decimal,

    // Counts
    #[serde(default)]
    pub gmv_units: u64,
    #[serde(default)]
    pub net_units: u64,
    #[serde(default)]
    pub uv: u64,
    #[serde(default)]
    pub buyers: u64,
    #[serde(default)]
    pub orders: u64,
    #[serde(default)]
    pub paid_traffic: u64,
    #[serde(default)]
    pub free_traffic: u64,

    /// Populated only when `channel == ChannelType::DirectToConsumer`.
    #[serde(default)]
    pub breakdown: Option<DtcBreakdown>,
}

/// A named sub-channel's summed contribution over one month, extracted from
/// the daily breakdowns. This is the quantity the exclusion engine subtracts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubChannelMonthly {
    pub sub_channel: SubChannel,
    pub net: Decimal,
    pub gmv: Decimal,
    pub traffic: u64,
    pub spend: Option<Decimal>,
    /// Number of daily slices that contributed.
    pub day_count: usize,
}

impl SubChannelMonthly {
    /// An all-zero contribution, used when a period has no recorded slices.
    pub fn zero(sub: SubChannel) -> Self {
        Self {
            sub_channel: sub,
            net: Decimal::ZERO,
            gmv: Decimal::ZERO,
            traffic: 0,
            spend: None,
            day_count: 0,
        }
    }

    /// True when no daily slice contributed to this contribution.
    pub fn is_empty(&self) -> bool {
        self.day_count == 0
    }
}

/// One (year, month, channel) reporting result.
///
/// Created with zeroed sums and undefined ratios, then enriched in place by
/// the aggregator, the metric calculator, the growth calculator and the
/// fiscal calculator. Exactly one instance per (year, month, channel) exists
/// in a pipeline's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyMetric {
    pub year: i32,
    pub month: u32,
    pub channel: ChannelType,

    // I. Summed quantities
    pub gmv: Decimal,
    pub net: Decimal,
    pub cancel_amount: Decimal,
    pub return_amount: Decimal,
    pub gmv_units: u64,
    pub net_units: u64,
    pub uv: u64,
    pub buyers: u64,
    pub orders: u64,
    pub paid_traffic: u64,
    pub free_traffic: u64,
    /// Number of distinct dates that contributed to the sums.
    pub day_count: usize,

    // II. Derived ratios (None = undefined, e.g. a zero denominator)
    pub aov: Option<Decimal>,
    pub atv: Option<Decimal>,
    pub aur: Option<Decimal>,
    pub cr: Option<Decimal>,
    pub upt: Option<Decimal>,
    pub repeat_rate: Option<Decimal>,
    pub cancel_rate: Option<Decimal>,
    pub return_rate: Option<Decimal>,
    pub rrc: Option<Decimal>,
    pub rrc_after_cancel: Option<Decimal>,

    // III. Growth annotations, per metric (absent key = undefined)
    #[serde(default)]
    pub yoy: BTreeMap<Metric, Decimal>,
    #[serde(default)]
    pub mom: BTreeMap<Metric, Decimal>,

    // IV. Fiscal annotation
    #[serde(default)]
    pub fiscal_year: Option<i32>,

    /// This channel's net as a percentage of the period's TOTAL net.
    /// Undefined for TOTAL itself and for periods without a TOTAL entry.
    #[serde(default)]
    pub net_share: Option<Decimal>,
}

impl MonthlyMetric {
    /// Creates a zeroed result for the given period and channel.
    pub fn new(year: i32, month: u32, channel: ChannelType) -> Self {
        Self {
            year,
            month,
            channel,
            gmv: Decimal::ZERO,
            net: Decimal::ZERO,
            cancel_amount: Decimal::ZERO,
            return_amount: Decimal::ZERO,
            gmv_units: 0,
            net_units: 0,
            uv: 0,
            buyers: 0,
            orders: 0,
            paid_traffic: 0,
            free_traffic: 0,
            day_count: 0,
            aov: None,
            atv: None,
            aur: None,
            cr: None,
            upt: None,
            repeat_rate: None,
            cancel_rate: None,
            return_rate: None,
            rrc: None,
            rrc_after_cancel: None,
            yoy: BTreeMap::new(),
            mom: BTreeMap::new(),
            fiscal_year: None,
            net_share: None,
        }
    }

    /// The period formatted as `YYYY-MM`.
    pub fn period(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }

    /// Generic field access: the value of any metric as a `Decimal`.
    ///
    /// Summed quantities are always defined; ratios return their stored
    /// (possibly undefined) value. This is what makes per-field growth a
    /// single loop instead of twenty-one hand-written comparisons.
    pub fn value(&self, metric: Metric) -> Option<Decimal> {
        match metric {
            Metric::Gmv => Some(self.gmv),
            Metric::Net => Some(self.net),
            Metric::GmvUnits => Some(Decimal::from(self.gmv_units)),
            Metric::NetUnits => Some(Decimal::from(self.net_units)),
            Metric::Uv => Some(Decimal::from(self.uv)),
            Metric::Buyers => Some(Decimal::from(self.buyers)),
            Metric::Orders => Some(Decimal::from(self.orders)),
            Metric::PaidTraffic => Some(Decimal::from(self.paid_traffic)),
            Metric::FreeTraffic => Some(Decimal::from(self.free_traffic)),
            Metric::CancelAmount => Some(self.cancel_amount),
            Metric::ReturnAmount => Some(self.return_amount),
            Metric::Aov => self.aov,
            Metric::Atv => self.atv,
            Metric::Aur => self.aur,
            Metric::Cr => self.cr,
            Metric::Upt => self.upt,
            Metric::RepeatRate => self.repeat_rate,
            Metric::CancelRate => self.cancel_rate,
            Metric::ReturnRate => self.return_rate,
            Metric::Rrc => self.rrc,
            Metric::RrcAfterCancel => self.rrc_after_cancel,
        }
    }

    /// Year-over-year growth for a metric, in percent.
    pub fn yoy_growth(&self, metric: Metric) -> Option<Decimal> {
        self.yoy.get(&metric).copied()
    }

    /// Month-over-month growth for a metric, in percent.
    pub fn mom_growth(&self, metric: Metric) -> Option<Decimal> {
        self.mom.get(&metric).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn new_metric_has_undefined_ratios() {
        let m = MonthlyMetric::new(2025, 6, ChannelType::Total);
        assert_eq!(m.gmv, Decimal::ZERO);
        assert_eq!(m.aov, None);
        assert_eq!(m.value(Metric::Cr), None);
        assert_eq!(m.value(Metric::Net), Some(Decimal::ZERO));
    }

    #[test]
    fn period_is_zero_padded() {
        let m = MonthlyMetric::new(2025, 4, ChannelType::Platform);
        assert_eq!(m.period(), "2025-04");
    }

    #[test]
    fn value_exposes_counts_as_decimal() {
        let mut m = MonthlyMetric::new(2025, 6, ChannelType::DirectToConsumer);
        m.uv = 1_200;
        m.aov = Some(dec!(185.50));
        assert_eq!(m.value(Metric::Uv), Some(dec!(1200)));
        assert_eq!(m.value(Metric::Aov), Some(dec!(185.50)));
    }

    #[test]
    fn breakdown_slice_lookup() {
        let breakdown = DtcBreakdown {
            social: Some(SubChannelSlice {
                net: dec!(100),
                gmv: dec!(120),
                traffic: 50,
                spend: Some(dec!(10)),
            }),
            ..DtcBreakdown::default()
        };
        assert!(breakdown.slice(SubChannel::Social).is_some());
        assert!(breakdown.slice(SubChannel::Employee).is_none());
    }
}
