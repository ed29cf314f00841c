use crate::engine::ChannelAggregator;
use core_types::{ChannelType, DailyRecord, MonthlyMetric, SubChannel};
use metrics::within_relative_tolerance;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Which arithmetic relation a mismatch violates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HierarchyRule {
    /// TOTAL.net = PLATFORM.net + DTC.net
    TotalVsParts,
    /// TOTAL.gmv = PLATFORM.gmv + DTC.gmv
    TotalVsPartsGmv,
    /// DTC.net = sum of its sub-channel nets
    DtcVsSubChannels,
}

impl fmt::Display for HierarchyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HierarchyRule::TotalVsParts => "TOTAL.net vs PLATFORM.net + DTC.net",
            HierarchyRule::TotalVsPartsGmv => "TOTAL.gmv vs PLATFORM.gmv + DTC.gmv",
            HierarchyRule::DtcVsSubChannels => "DTC.net vs sum of sub-channel nets",
        };
        f.write_str(s)
    }
}

/// One hierarchy relation that disagrees beyond the tolerance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyMismatch {
    pub year: i32,
    pub month: u32,
    pub rule: HierarchyRule,
    pub actual: Decimal,
    pub expected: Decimal,
}

impl fmt::Display for HierarchyMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{:02}: {} mismatch: {} vs expected {}",
            self.year, self.month, self.rule, self.actual, self.expected
        )
    }
}

impl ChannelAggregator {
    /// Checks the channel hierarchy arithmetic for every period present in
    /// `monthly`, within a relative `tolerance` that absorbs upstream
    /// rounding. Mismatches are returned, never raised: the aggregation
    /// output stands regardless.
    pub fn validate_hierarchy(
        &self,
        records: &[DailyRecord],
        monthly: &[MonthlyMetric],
        tolerance: Decimal,
    ) -> Vec<HierarchyMismatch> {
        let mut by_period: BTreeMap<(i32, u32), BTreeMap<ChannelType, &MonthlyMetric>> =
            BTreeMap::new();
        for metric in monthly {
            by_period
                .entry((metric.year, metric.month))
                .or_default()
                .insert(metric.channel, metric);
        }

        let mut mismatches = Vec::new();

        for (&(year, month), channels) in &by_period {
            let platform = channels.get(&ChannelType::Platform);
            let dtc = channels.get(&ChannelType::DirectToConsumer);
            let total = channels.get(&ChannelType::Total);

            if let (Some(platform), Some(dtc), Some(total)) = (platform, dtc, total) {
                let expected_net = platform.net + dtc.net;
                if !within_relative_tolerance(total.net, expected_net, tolerance) {
                    mismatches.push(HierarchyMismatch {
                        year,
                        month,
                        rule: HierarchyRule::TotalVsParts,
                        actual: total.net,
                        expected: expected_net,
                    });
                }

                let expected_gmv = platform.gmv + dtc.gmv;
                if !within_relative_tolerance(total.gmv, expected_gmv, tolerance) {
                    mismatches.push(HierarchyMismatch {
                        year,
                        month,
                        rule: HierarchyRule::TotalVsPartsGmv,
                        actual: total.gmv,
                        expected: expected_gmv,
                    });
                }
            }

            // DTC vs its sub-channel breakdown, when the month recorded one.
            if let Some(dtc) = dtc {
                let mut breakdown_net = Decimal::ZERO;
                let mut any_own = false;
                for sub in SubChannel::ALL {
                    let contribution = self.sub_channel_month(records, year, month, sub);
                    if !contribution.is_empty() {
                        any_own = true;
                        breakdown_net += contribution.net;
                    }
                }
                if any_own && !within_relative_tolerance(dtc.net, breakdown_net, tolerance) {
                    mismatches.push(HierarchyMismatch {
                        year,
                        month,
                        rule: HierarchyRule::DtcVsSubChannels,
                        actual: dtc.net,
                        expected: breakdown_net,
                    });
                }
            }
        }

        mismatches
    }
}
