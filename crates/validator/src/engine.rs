use crate::report::{Finding, Severity, ValidationReport};
use core_types::{ChannelType, DailyRecord, Metric, MonthlyMetric};
use metrics::within_relative_tolerance;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Runs structural and relational checks over monthly output.
#[derive(Debug)]
pub struct DataValidator {
    /// Relative tolerance for hierarchy and identity comparisons.
    tolerance: Decimal,
}

impl DataValidator {
    pub fn new(tolerance: Decimal) -> Self {
        Self { tolerance }
    }

    /// Screens daily input before aggregation. Structurally invalid records
    /// are rejected with a stated reason and excluded from the returned set;
    /// the caller decides whether rejections abort the whole run.
    pub fn screen_daily(&self, records: &[DailyRecord]) -> (Vec<DailyRecord>, Vec<Finding>) {
        let mut accepted = Vec::with_capacity(records.len());
        let mut findings = Vec::new();

        for record in records {
            let context = format!("{} {}", record.date, record.channel);
            let mut reasons = Vec::new();

            for (name, amount) in [
                ("gmv", record.gmv),
                ("net", record.net),
                ("cancel_amount", record.cancel_amount),
                ("return_amount", record.return_amount),
            ] {
                if amount < Decimal::ZERO {
                    reasons.push(format!("negative {name} ({amount})"));
                }
            }
            if record.buyers > record.uv {
                reasons.push(format!(
                    "buyers ({}) exceed unique visitors ({})",
                    record.buyers, record.uv
                ));
            }
            if record.breakdown.is_some() && record.channel != ChannelType::DirectToConsumer {
                reasons.push("sub-channel breakdown on a non-DTC record".to_string());
            }
            if record.channel.is_derived() {
                reasons.push(format!("derived channel {} in daily input", record.channel));
            }

            if reasons.is_empty() {
                accepted.push(record.clone());
            } else {
                findings.push(Finding {
                    severity: Severity::Error,
                    context,
                    message: format!("record rejected: {}", reasons.join("; ")),
                });
            }
        }

        (accepted, findings)
    }

    /// Runs every structural and relational check over a finished monthly
    /// set. Read-only: the input is never mutated.
    pub fn validate(&self, monthly: &[MonthlyMetric]) -> ValidationReport {
        let mut report = ValidationReport::new();

        self.check_duplicates(monthly, &mut report);
        for metric in monthly {
            self.check_structural(metric, &mut report);
            self.check_identities(metric, &mut report);
        }
        self.check_hierarchy(monthly, &mut report);

        info!(
            checks = report.checks_run,
            errors = report.error_count(),
            warnings = report.warning_count(),
            score = %report.quality_score(),
            "validation completed"
        );
        report
    }

    /// Exactly one MonthlyMetric per (year, month, channel).
    fn check_duplicates(&self, monthly: &[MonthlyMetric], report: &mut ValidationReport) {
        let mut seen = BTreeSet::new();
        for metric in monthly {
            let key = (metric.year, metric.month, metric.channel);
            if seen.insert(key) {
                report.record_pass();
            } else {
                report.add_error(
                    format!("{} {}", metric.period(), metric.channel),
                    "duplicate monthly result for this period and channel",
                );
            }
        }
    }

    fn check_structural(&self, metric: &MonthlyMetric, report: &mut ValidationReport) {
        let context = format!("{} {}", metric.period(), metric.channel);

        // Percentage-typed fields lie in [0, 100] when defined.
        for field in Metric::ALL.into_iter().filter(Metric::is_percentage) {
            match metric.value(field) {
                Some(v) if v < Decimal::ZERO || v > Decimal::ONE_HUNDRED => {
                    report.add_error(
                        context.clone(),
                        format!("percentage field {field:?} out of range: {v}"),
                    );
                }
                _ => report.record_pass(),
            }
        }

        // Amount fields are non-negative. Counts are unsigned by type.
        for (name, amount) in [
            ("gmv", metric.gmv),
            ("net", metric.net),
            ("cancel_amount", metric.cancel_amount),
            ("return_amount", metric.return_amount),
        ] {
            if amount < Decimal::ZERO {
                report.add_error(context.clone(), format!("negative {name}: {amount}"));
            } else {
                report.record_pass();
            }
        }

        // Net is gross value minus deductions; the reverse is suspicious but
        // not impossible upstream, so it only warns.
        if metric.net > metric.gmv {
            report.add_warning(
                context.clone(),
                format!("net ({}) exceeds gmv ({})", metric.net, metric.gmv),
            );
        } else {
            report.record_pass();
        }

        if metric.buyers > metric.uv {
            report.add_error(
                context.clone(),
                format!(
                    "buyers ({}) exceed unique visitors ({})",
                    metric.buyers, metric.uv
                ),
            );
        } else {
            report.record_pass();
        }

        // Repeat purchases can only push orders above buyers, never below.
        if metric.orders < metric.buyers {
            report.add_warning(
                context,
                format!(
                    "orders ({}) below buyers ({})",
                    metric.orders, metric.buyers
                ),
            );
        } else {
            report.record_pass();
        }
    }

    /// Ratio identities, checked only when every participating value is
    /// defined. Undefined ratios are not identity violations.
    fn check_identities(&self, metric: &MonthlyMetric, report: &mut ValidationReport) {
        let context = format!("{} {}", metric.period(), metric.channel);

        let identities: [(&str, Option<Decimal>, Option<Decimal>); 3] = [
            (
                "aov = aur x upt",
                metric.aov,
                metric.aur.zip(metric.upt).map(|(a, b)| a * b),
            ),
            (
                "atv = aov x repeat_rate",
                metric.atv,
                metric.aov.zip(metric.repeat_rate).map(|(a, b)| a * b),
            ),
            (
                "rrc = cancel_rate + return_rate",
                metric.rrc,
                metric
                    .cancel_rate
                    .zip(metric.return_rate)
                    .map(|(a, b)| a + b),
            ),
        ];

        for (name, actual, expected) in identities {
            let (Some(actual), Some(expected)) = (actual, expected) else {
                continue;
            };
            if within_relative_tolerance(actual, expected, self.tolerance) {
                report.record_pass();
            } else {
                report.add_warning(
                    context.clone(),
                    format!("identity drift: {name} ({actual} vs {expected})"),
                );
            }
        }

        // Per-transaction value can exceed per-order value (repeat purchases)
        // and per-order value can exceed per-unit retail (multi-unit orders),
        // never the reverse.
        let orderings: [(&str, Option<Decimal>, Option<Decimal>); 2] = [
            ("atv >= aov", metric.atv, metric.aov),
            ("aov >= aur", metric.aov, metric.aur),
        ];

        for (name, left, right) in orderings {
            let (Some(left), Some(right)) = (left, right) else {
                continue;
            };
            if left >= right {
                report.record_pass();
            } else {
                report.add_warning(
                    context.clone(),
                    format!("ordering violated: {name} ({left} vs {right})"),
                );
            }
        }
    }

    /// TOTAL = PLATFORM + DTC per period, on net, within tolerance.
    fn check_hierarchy(&self, monthly: &[MonthlyMetric], report: &mut ValidationReport) {
        let mut by_period: BTreeMap<(i32, u32), BTreeMap<ChannelType, &MonthlyMetric>> =
            BTreeMap::new();
        for metric in monthly {
            by_period
                .entry((metric.year, metric.month))
                .or_default()
                .insert(metric.channel, metric);
        }

        for ((year, month), channels) in by_period {
            let (Some(platform), Some(dtc), Some(total)) = (
                channels.get(&ChannelType::Platform),
                channels.get(&ChannelType::DirectToConsumer),
                channels.get(&ChannelType::Total),
            ) else {
                continue;
            };
            let expected = platform.net + dtc.net;
            if within_relative_tolerance(total.net, expected, self.tolerance) {
                report.record_pass();
            } else {
                report.add_warning(
                    format!("{year}-{month:02} TOTAL"),
                    format!("net ({}) drifts from PLATFORM + DTC ({expected})", total.net),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use metrics::MetricCalculator;
    use rust_decimal_macros::dec;

    fn validator() -> DataValidator {
        DataValidator::new(dec!(0.005))
    }

    fn clean_month(channel: ChannelType, net: Decimal) -> MonthlyMetric {
        let mut m = MonthlyMetric::new(2025, 6, channel);
        m.net = net;
        m.gmv = net * dec!(1.1);
        m.uv = 10_000;
        m.buyers = 300;
        m.orders = 360;
        m.gmv_units = 500;
        m.day_count = 30;
        MetricCalculator::new().recompute(&mut m);
        m
    }

    #[test]
    fn clean_set_passes_with_full_score() {
        let set = vec![
            clean_month(ChannelType::Platform, dec!(4000)),
            clean_month(ChannelType::DirectToConsumer, dec!(6000)),
            clean_month(ChannelType::Total, dec!(10000)),
        ];
        let report = validator().validate(&set);
        assert!(report.is_valid());
        assert!(report.findings.is_empty());
        assert_eq!(report.quality_score(), Decimal::ONE);
    }

    #[test]
    fn duplicate_periods_are_errors() {
        let set = vec![
            clean_month(ChannelType::Total, dec!(1000)),
            clean_month(ChannelType::Total, dec!(1000)),
        ];
        let report = validator().validate(&set);
        assert!(!report.is_valid());
        assert!(
            report
                .findings
                .iter()
                .any(|f| f.message.contains("duplicate"))
        );
    }

    #[test]
    fn buyers_above_visitors_is_an_error() {
        let mut m = clean_month(ChannelType::DirectToConsumer, dec!(1000));
        m.buyers = m.uv + 1;
        let report = validator().validate(&[m]);
        assert!(!report.is_valid());
    }

    #[test]
    fn orders_below_buyers_is_only_a_warning() {
        let mut m = clean_month(ChannelType::DirectToConsumer, dec!(1000));
        m.orders = m.buyers - 1;
        MetricCalculator::new().recompute(&mut m);
        let report = validator().validate(&[m]);
        // Fewer orders than buyers also drags ATV below AOV, so the ordering
        // check warns alongside it; neither is an error.
        assert!(report.is_valid());
        assert!(
            report
                .findings
                .iter()
                .any(|f| f.message.contains("below buyers"))
        );
    }

    #[test]
    fn net_above_gmv_is_a_warning() {
        let mut m = clean_month(ChannelType::Platform, dec!(1000));
        m.net = m.gmv + dec!(1);
        let report = validator().validate(&[m]);
        assert!(report.is_valid());
        assert!(
            report
                .findings
                .iter()
                .any(|f| f.message.contains("exceeds gmv"))
        );
    }

    #[test]
    fn inverted_value_ordering_is_flagged() {
        // More orders than gross units pushes AOV below AUR, which no real
        // month can do.
        let mut m = clean_month(ChannelType::DirectToConsumer, dec!(1000));
        m.orders = 500;
        m.gmv_units = 100;
        MetricCalculator::new().recompute(&mut m);

        let report = validator().validate(&[m]);
        assert!(report.is_valid());
        assert!(
            report
                .findings
                .iter()
                .any(|f| f.message.contains("ordering violated: aov >= aur"))
        );
    }

    #[test]
    fn tampered_ratio_trips_identity_check() {
        let mut m = clean_month(ChannelType::Total, dec!(1000));
        m.aov = m.aov.map(|v| v * dec!(2));
        let report = validator().validate(&[m]);
        assert!(
            report
                .findings
                .iter()
                .any(|f| f.message.contains("identity drift"))
        );
    }

    #[test]
    fn hierarchy_drift_is_a_warning() {
        let set = vec![
            clean_month(ChannelType::Platform, dec!(4000)),
            clean_month(ChannelType::DirectToConsumer, dec!(6000)),
            clean_month(ChannelType::Total, dec!(11000)),
        ];
        let report = validator().validate(&set);
        assert!(report.is_valid());
        assert!(report.warning_count() >= 1);
    }

    #[test]
    fn screening_rejects_bad_records_with_reasons() {
        let good = DailyRecord {
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            channel: ChannelType::Platform,
            gmv: dec!(100),
            net: dec!(90),
            cancel_amount: Decimal::ZERO,
            return_amount: Decimal::ZERO,
            gmv_units: 2,
            net_units: 2,
            uv: 100,
            buyers: 5,
            orders: 5,
            paid_traffic: 40,
            free_traffic: 60,
            breakdown: None,
        };
        let mut bad = good.clone();
        bad.net = dec!(-5);
        bad.buyers = 200;

        let (accepted, findings) = validator().screen_daily(&[good.clone(), bad]);
        assert_eq!(accepted, vec![good]);
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("negative net"));
        assert!(findings[0].message.contains("exceed unique visitors"));
    }
}
