use crate::error::AggregationError;
use chrono::Datelike;
use core_types::{ChannelType, DailyRecord, MonthlyMetric, SubChannel, SubChannelMonthly};
use metrics::MetricCalculator;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Sums daily records into monthly per-channel results.
#[derive(Debug, Default)]
pub struct ChannelAggregator {
    calculator: MetricCalculator,
}

impl ChannelAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregates every record for one (year, month, base channel) into a
    /// single `MonthlyMetric`: sums the summable fields, counts distinct
    /// contributing dates, then derives the ratio fields from the sums.
    pub fn aggregate_month(
        &self,
        records: &[DailyRecord],
        year: i32,
        month: u32,
        channel: ChannelType,
    ) -> Result<MonthlyMetric, AggregationError> {
        if channel.is_derived() {
            return Err(AggregationError::DerivedChannel(channel));
        }

        let mut metric = MonthlyMetric::new(year, month, channel);
        let mut dates: BTreeSet<_> = BTreeSet::new();

        for record in records.iter().filter(|r| {
            r.channel == channel && r.date.year() == year && r.date.month() == month
        }) {
            metric.gmv += record.gmv;
            metric.net += record.net;
            metric.cancel_amount += record.cancel_amount;
            metric.return_amount += record.return_amount;
            metric.gmv_units += record.gmv_units;
            metric.net_units += record.net_units;
            metric.uv += record.uv;
            metric.buyers += record.buyers;
            metric.orders += record.orders;
            metric.paid_traffic += record.paid_traffic;
            metric.free_traffic += record.free_traffic;
            dates.insert(record.date);
        }

        if dates.is_empty() {
            return Err(AggregationError::NoData {
                year,
                month,
                channel,
            });
        }

        metric.day_count = dates.len();
        self.calculator.recompute(&mut metric);

        debug!(
            period = %metric.period(),
            channel = %channel,
            days = metric.day_count,
            net = %metric.net,
            "aggregated month"
        );
        Ok(metric)
    }

    /// Aggregates every (year, month) present in the records, for each of the
    /// requested base channels. Output is ordered by (year, month, channel);
    /// periods where a channel has no records are simply absent.
    pub fn aggregate_all(
        &self,
        records: &[DailyRecord],
        channels: &[ChannelType],
    ) -> Vec<MonthlyMetric> {
        let periods: BTreeSet<(i32, u32)> = records
            .iter()
            .map(|r| (r.date.year(), r.date.month()))
            .collect();

        let mut monthly = Vec::new();
        for &(year, month) in &periods {
            for &channel in channels {
                match self.aggregate_month(records, year, month, channel) {
                    Ok(metric) => monthly.push(metric),
                    Err(AggregationError::NoData { .. }) => {}
                    Err(AggregationError::DerivedChannel(channel)) => {
                        warn!(%channel, "skipping derived channel in base aggregation");
                    }
                }
            }
        }
        monthly
    }

    /// Sums one named sub-channel's contribution across a month's DTC
    /// records. A period with no recorded slices yields a zero contribution
    /// rather than an error; the caller decides whether that is noteworthy.
    pub fn sub_channel_month(
        &self,
        records: &[DailyRecord],
        year: i32,
        month: u32,
        sub: SubChannel,
    ) -> SubChannelMonthly {
        let mut contribution = SubChannelMonthly::zero(sub);
        let mut spend_seen = false;
        let mut spend = Decimal::ZERO;

        for record in records.iter().filter(|r| {
            r.channel == ChannelType::DirectToConsumer
                && r.date.year() == year
                && r.date.month() == month
        }) {
            let Some(slice) = record.breakdown.as_ref().and_then(|b| b.slice(sub)) else {
                continue;
            };
            contribution.net += slice.net;
            contribution.gmv += slice.gmv;
            contribution.traffic += slice.traffic;
            contribution.day_count += 1;
            if let Some(s) = slice.spend {
                spend_seen = true;
                spend += s;
            }
        }

        if spend_seen {
            contribution.spend = Some(spend);
        }
        contribution
    }

    /// Stamps every entry with its net share of the period's TOTAL net, in
    /// percent. TOTAL itself and periods without a usable TOTAL entry are
    /// left undefined.
    pub fn annotate_net_share(&self, monthly: &mut [MonthlyMetric]) {
        let totals: BTreeMap<(i32, u32), Decimal> = monthly
            .iter()
            .filter(|m| m.channel == ChannelType::Total)
            .map(|m| ((m.year, m.month), m.net))
            .collect();

        for metric in monthly.iter_mut() {
            metric.net_share = match totals.get(&(metric.year, metric.month)) {
                Some(&total) if !total.is_zero() && metric.channel != ChannelType::Total => {
                    Some(metric.net / total * Decimal::ONE_HUNDRED)
                }
                _ => None,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::{DtcBreakdown, SubChannelSlice};
    use rust_decimal_macros::dec;

    fn day(d: u32, channel: ChannelType, net: Decimal, uv: u64) -> DailyRecord {
        DailyRecord {
            date: NaiveDate::from_ymd_opt(2025, 6, d).unwrap(),
            channel,
            gmv: net * dec!(1.2),
            net,
            cancel_amount: Decimal::ZERO,
            return_amount: Decimal::ZERO,
            gmv_units: 10,
            net_units: 9,
            uv,
            buyers: 40,
            orders: 50,
            paid_traffic: 30,
            free_traffic: 70,
            breakdown: None,
        }
    }

    #[test]
    fn sums_across_days_and_counts_distinct_dates() {
        let records = vec![
            day(1, ChannelType::DirectToConsumer, dec!(1000), 500),
            day(2, ChannelType::DirectToConsumer, dec!(2000), 700),
            day(2, ChannelType::Platform, dec!(5000), 900),
        ];
        let agg = ChannelAggregator::new();
        let m = agg
            .aggregate_month(&records, 2025, 6, ChannelType::DirectToConsumer)
            .unwrap();

        assert_eq!(m.net, dec!(3000));
        assert_eq!(m.uv, 1200);
        assert_eq!(m.day_count, 2);
        assert_eq!(m.gmv_units, 20);
        // ratios are derived from the summed month, not averaged per day
        assert_eq!(m.aov, Some(m.gmv / Decimal::from(m.orders)));
    }

    #[test]
    fn no_matching_records_is_an_error() {
        let records = vec![day(1, ChannelType::Platform, dec!(1000), 500)];
        let agg = ChannelAggregator::new();
        let result = agg.aggregate_month(&records, 2025, 7, ChannelType::Platform);
        assert!(matches!(result, Err(AggregationError::NoData { .. })));
    }

    #[test]
    fn derived_channel_is_rejected() {
        let agg = ChannelAggregator::new();
        let result = agg.aggregate_month(&[], 2025, 6, ChannelType::CoreBusiness);
        assert!(matches!(result, Err(AggregationError::DerivedChannel(_))));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let records = vec![
            day(1, ChannelType::DirectToConsumer, dec!(1000), 500),
            day(2, ChannelType::DirectToConsumer, dec!(2000), 700),
        ];
        let agg = ChannelAggregator::new();
        let first = agg.aggregate_all(&records, &ChannelType::BASE);
        let second = agg.aggregate_all(&records, &ChannelType::BASE);
        assert_eq!(first, second);
    }

    #[test]
    fn net_share_is_relative_to_the_period_total() {
        let mut monthly = Vec::new();
        for (channel, net) in [
            (ChannelType::Platform, dec!(4000)),
            (ChannelType::DirectToConsumer, dec!(6000)),
            (ChannelType::Total, dec!(10000)),
        ] {
            let mut m = MonthlyMetric::new(2025, 6, channel);
            m.net = net;
            monthly.push(m);
        }
        // A period with no TOTAL entry stays undefined.
        let mut orphan = MonthlyMetric::new(2025, 7, ChannelType::Platform);
        orphan.net = dec!(500);
        monthly.push(orphan);

        let agg = ChannelAggregator::new();
        agg.annotate_net_share(&mut monthly);

        assert_eq!(monthly[0].net_share, Some(dec!(40)));
        assert_eq!(monthly[1].net_share, Some(dec!(60)));
        assert_eq!(monthly[2].net_share, None);
        assert_eq!(monthly[3].net_share, None);
    }

    #[test]
    fn sub_channel_contribution_sums_slices() {
        let mut rec = day(1, ChannelType::DirectToConsumer, dec!(1000), 500);
        rec.breakdown = Some(DtcBreakdown {
            employee: Some(SubChannelSlice {
                net: dec!(120),
                gmv: dec!(150),
                traffic: 25,
                spend: None,
            }),
            ..DtcBreakdown::default()
        });
        let mut rec2 = day(2, ChannelType::DirectToConsumer, dec!(2000), 700);
        rec2.breakdown = Some(DtcBreakdown {
            employee: Some(SubChannelSlice {
                net: dec!(80),
                gmv: dec!(100),
                traffic: 15,
                spend: None,
            }),
            ..DtcBreakdown::default()
        });

        let agg = ChannelAggregator::new();
        let ff = agg.sub_channel_month(&[rec, rec2], 2025, 6, SubChannel::Employee);
        assert_eq!(ff.net, dec!(200));
        assert_eq!(ff.traffic, 40);
        assert_eq!(ff.day_count, 2);

        let social = agg.sub_channel_month(&[], 2025, 6, SubChannel::Social);
        assert!(social.is_empty());
        assert_eq!(social.net, Decimal::ZERO);
    }
}
