use crate::config::{ExclusionConfig, derivation_rule};
use crate::error::ExclusionError;
use core_types::{ChannelType, MonthlyMetric, SubChannel, SubChannelMonthly};
use metrics::MetricCalculator;
use tracing::{debug, warn};

/// A graceful degradation record: a derived channel was requested but one of
/// its excluded sub-channels had no data for the period, so its contribution
/// was treated as zero. Surfaced in the validation report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionNote {
    pub year: i32,
    pub month: u32,
    pub channel: ChannelType,
    pub sub_channel: SubChannel,
}

impl std::fmt::Display for SubstitutionNote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{:02} {}: no {} contribution recorded, treated as zero",
            self.year, self.month, self.channel, self.sub_channel
        )
    }
}

/// The outcome of one period's derivation: the derived monthly results plus
/// any zero-substitutions that were applied along the way.
#[derive(Debug, Clone, Default)]
pub struct DerivedSet {
    pub metrics: Vec<MonthlyMetric>,
    pub notes: Vec<SubstitutionNote>,
}

/// Derives exclusion variants and the core business composite from
/// already-aggregated monthly sums.
#[derive(Debug, Default)]
pub struct ExclusionEngine {
    calculator: MetricCalculator,
}

impl ExclusionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a DTC exclusion variant by subtracting the named sub-channel
    /// contributions' absolute quantities from the DTC sums, field-wise,
    /// then recomputing every ratio from the adjusted sums.
    ///
    /// A sub-channel with no entry in `contributions` is treated as zero;
    /// the caller is responsible for noting that substitution.
    pub fn derive_excluding(
        &self,
        dtc: &MonthlyMetric,
        contributions: &[SubChannelMonthly],
        target: ChannelType,
    ) -> Result<MonthlyMetric, ExclusionError> {
        let rule = derivation_rule(target).ok_or(ExclusionError::NotDerivable(target))?;
        if rule.composes_with_platform {
            return Err(ExclusionError::Composite(target));
        }
        if dtc.channel != ChannelType::DirectToConsumer {
            return Err(ExclusionError::WrongBase {
                expected: ChannelType::DirectToConsumer,
                found: dtc.channel,
            });
        }

        let mut derived = dtc.clone();
        derived.channel = target;
        // Derived channels start with fresh annotations; growth and fiscal
        // enrichment happen downstream on the derived series itself.
        derived.yoy.clear();
        derived.mom.clear();
        derived.fiscal_year = None;
        derived.net_share = None;

        for &sub in rule.excludes {
            let contribution = contributions.iter().find(|c| c.sub_channel == sub);
            let Some(contribution) = contribution else {
                continue;
            };
            derived.net -= contribution.net;
            derived.gmv -= contribution.gmv;
            derived.uv = derived.uv.saturating_sub(contribution.traffic);
        }

        self.calculator.recompute(&mut derived);
        debug!(period = %derived.period(), channel = %target, net = %derived.net, "derived exclusion variant");
        Ok(derived)
    }

    /// Builds the core business composite: the elementwise sum of the
    /// platform channel's sums and the "DTC excluding employee and social"
    /// variant's sums, with every ratio recomputed from the combined sums.
    pub fn core_business(
        &self,
        platform: &MonthlyMetric,
        dtc_excl: &MonthlyMetric,
    ) -> Result<MonthlyMetric, ExclusionError> {
        if platform.channel != ChannelType::Platform {
            return Err(ExclusionError::WrongBase {
                expected: ChannelType::Platform,
                found: platform.channel,
            });
        }
        if dtc_excl.channel != ChannelType::DtcExcludingEmployeeAndSocial {
            return Err(ExclusionError::WrongBase {
                expected: ChannelType::DtcExcludingEmployeeAndSocial,
                found: dtc_excl.channel,
            });
        }
        if (platform.year, platform.month) != (dtc_excl.year, dtc_excl.month) {
            return Err(ExclusionError::PeriodMismatch {
                left_year: platform.year,
                left_month: platform.month,
                right_year: dtc_excl.year,
                right_month: dtc_excl.month,
            });
        }

        let mut composite = MonthlyMetric::new(platform.year, platform.month, ChannelType::CoreBusiness);
        composite.gmv = platform.gmv + dtc_excl.gmv;
        composite.net = platform.net + dtc_excl.net;
        composite.cancel_amount = platform.cancel_amount + dtc_excl.cancel_amount;
        composite.return_amount = platform.return_amount + dtc_excl.return_amount;
        composite.gmv_units = platform.gmv_units + dtc_excl.gmv_units;
        composite.net_units = platform.net_units + dtc_excl.net_units;
        composite.uv = platform.uv + dtc_excl.uv;
        composite.buyers = platform.buyers + dtc_excl.buyers;
        composite.orders = platform.orders + dtc_excl.orders;
        composite.paid_traffic = platform.paid_traffic + dtc_excl.paid_traffic;
        composite.free_traffic = platform.free_traffic + dtc_excl.free_traffic;
        composite.day_count = platform.day_count.max(dtc_excl.day_count);

        self.calculator.recompute(&mut composite);
        Ok(composite)
    }

    /// Derives every channel a configuration asks for, for one period.
    ///
    /// Missing sub-channel contributions degrade to zero with a
    /// [`SubstitutionNote`]; a missing base channel skips the derivation
    /// entirely (there is nothing sensible to subtract from).
    pub fn derive_all(
        &self,
        platform: Option<&MonthlyMetric>,
        dtc: Option<&MonthlyMetric>,
        contributions: &[SubChannelMonthly],
        config: &ExclusionConfig,
    ) -> Result<DerivedSet, ExclusionError> {
        let requested = config.requested_channels();
        let mut set = DerivedSet::default();
        if requested.is_empty() {
            return Ok(set);
        }

        let Some(dtc) = dtc else {
            warn!("no DTC month available, skipping all derived channels");
            return Ok(set);
        };

        for &channel in requested
            .iter()
            .filter(|c| derivation_rule(**c).is_some_and(|r| !r.composes_with_platform))
        {
            let rule = derivation_rule(channel).expect("filtered on rule presence");
            note_missing(&mut set.notes, contributions, dtc, channel, rule.excludes);
            set.metrics
                .push(self.derive_excluding(dtc, contributions, channel)?);
        }

        if requested.contains(&ChannelType::CoreBusiness) {
            let Some(platform) = platform else {
                warn!("no PLATFORM month available, skipping CORE_BUSINESS");
                return Ok(set);
            };
            // The composite builds on the double-exclusion variant whether or
            // not that variant was itself requested.
            let dtc_excl = match set
                .metrics
                .iter()
                .find(|m| m.channel == ChannelType::DtcExcludingEmployeeAndSocial)
            {
                Some(existing) => existing.clone(),
                None => {
                    let rule = derivation_rule(ChannelType::DtcExcludingEmployeeAndSocial)
                        .expect("registry covers all derived channels");
                    note_missing(
                        &mut set.notes,
                        contributions,
                        dtc,
                        ChannelType::CoreBusiness,
                        rule.excludes,
                    );
                    self.derive_excluding(
                        dtc,
                        contributions,
                        ChannelType::DtcExcludingEmployeeAndSocial,
                    )?
                }
            };
            set.metrics.push(self.core_business(platform, &dtc_excl)?);
        }

        Ok(set)
    }
}

/// Records a substitution note for every excluded sub-channel whose
/// contribution is missing or empty for the period.
fn note_missing(
    notes: &mut Vec<SubstitutionNote>,
    contributions: &[SubChannelMonthly],
    dtc: &MonthlyMetric,
    channel: ChannelType,
    excludes: &[SubChannel],
) {
    for &sub in excludes {
        let missing = contributions
            .iter()
            .find(|c| c.sub_channel == sub)
            .is_none_or(|c| c.is_empty());
        if missing {
            notes.push(SubstitutionNote {
                year: dtc.year,
                month: dtc.month,
                channel,
                sub_channel: sub,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn dtc_december() -> MonthlyMetric {
        let mut m = MonthlyMetric::new(2025, 12, ChannelType::DirectToConsumer);
        m.net = dec!(5638500);
        m.gmv = dec!(6000000);
        m.uv = 420_000;
        m.buyers = 9_000;
        m.orders = 10_000;
        m.gmv_units = 12_000;
        m.day_count = 31;
        m
    }

    fn contributions() -> Vec<SubChannelMonthly> {
        vec![
            SubChannelMonthly {
                sub_channel: SubChannel::Employee,
                net: dec!(228000),
                gmv: dec!(250000),
                traffic: 8_000,
                spend: None,
                day_count: 20,
            },
            SubChannelMonthly {
                sub_channel: SubChannel::Social,
                net: dec!(535000),
                gmv: dec!(560000),
                traffic: 30_000,
                spend: Some(dec!(120000)),
                day_count: 25,
            },
        ]
    }

    #[test]
    fn december_double_exclusion_scenario() {
        let engine = ExclusionEngine::new();
        let derived = engine
            .derive_excluding(
                &dtc_december(),
                &contributions(),
                ChannelType::DtcExcludingEmployeeAndSocial,
            )
            .unwrap();

        assert_eq!(derived.net, dec!(4875500));
        assert_eq!(derived.gmv, dec!(5190000));
        assert_eq!(derived.uv, 382_000);
        assert_eq!(derived.channel, ChannelType::DtcExcludingEmployeeAndSocial);
    }

    #[test]
    fn exclusion_plus_contribution_restores_dtc() {
        let engine = ExclusionEngine::new();
        let dtc = dtc_december();
        let contribs = contributions();
        let derived = engine
            .derive_excluding(&dtc, &contribs, ChannelType::DtcExcludingEmployee)
            .unwrap();

        let employee = &contribs[0];
        assert_eq!(derived.net + employee.net, dtc.net);
        assert_eq!(derived.gmv + employee.gmv, dtc.gmv);
    }

    #[test]
    fn ratios_are_recomputed_not_copied() {
        let engine = ExclusionEngine::new();
        let calc = MetricCalculator::new();
        let mut dtc = dtc_december();
        calc.recompute(&mut dtc);

        let derived = engine
            .derive_excluding(
                &dtc,
                &contributions(),
                ChannelType::DtcExcludingEmployeeAndSocial,
            )
            .unwrap();

        // Same orders, smaller gmv: the derived AOV must reflect the
        // adjusted sums, not the parent's ratio.
        assert_ne!(derived.aov, dtc.aov);
        assert_eq!(
            derived.aov,
            Some(derived.gmv / Decimal::from(derived.orders))
        );
    }

    #[test]
    fn core_business_is_elementwise_sum() {
        let engine = ExclusionEngine::new();
        let mut platform = MonthlyMetric::new(2025, 12, ChannelType::Platform);
        platform.net = dec!(3000000);
        platform.gmv = dec!(3300000);
        platform.uv = 500_000;
        platform.buyers = 11_000;
        platform.orders = 12_000;
        platform.day_count = 31;

        let derived = engine
            .derive_excluding(
                &dtc_december(),
                &contributions(),
                ChannelType::DtcExcludingEmployeeAndSocial,
            )
            .unwrap();
        let core = engine.core_business(&platform, &derived).unwrap();

        assert_eq!(core.net, dec!(7875500));
        assert_eq!(core.uv, 882_000);
        assert_eq!(core.channel, ChannelType::CoreBusiness);
        let calc = MetricCalculator::new();
        assert_eq!(core.cr, calc.conversion_rate(core.buyers, core.uv));
    }

    #[test]
    fn period_mismatch_is_rejected() {
        let engine = ExclusionEngine::new();
        let mut platform = MonthlyMetric::new(2025, 11, ChannelType::Platform);
        platform.net = dec!(100);
        let derived = engine
            .derive_excluding(
                &dtc_december(),
                &contributions(),
                ChannelType::DtcExcludingEmployeeAndSocial,
            )
            .unwrap();

        let result = engine.core_business(&platform, &derived);
        assert!(matches!(result, Err(ExclusionError::PeriodMismatch { .. })));
    }

    #[test]
    fn missing_contribution_degrades_to_zero_with_note() {
        let engine = ExclusionEngine::new();
        let dtc = dtc_december();
        let config = ExclusionConfig {
            exclude_employee_channel: true,
            exclude_social: false,
            derive_channels: Default::default(),
        };

        // No contributions recorded at all for the period.
        let set = engine.derive_all(None, Some(&dtc), &[], &config).unwrap();

        assert_eq!(set.metrics.len(), 1);
        assert_eq!(set.metrics[0].channel, ChannelType::DtcExcludingEmployee);
        assert_eq!(set.metrics[0].net, dtc.net);
        assert_eq!(set.notes.len(), 1);
        assert_eq!(set.notes[0].sub_channel, SubChannel::Employee);
    }

    #[test]
    fn derive_all_produces_requested_channels() {
        let engine = ExclusionEngine::new();
        let dtc = dtc_december();
        let mut platform = MonthlyMetric::new(2025, 12, ChannelType::Platform);
        platform.net = dec!(3000000);
        platform.day_count = 31;

        let set = engine
            .derive_all(
                Some(&platform),
                Some(&dtc),
                &contributions(),
                &ExclusionConfig::standard(),
            )
            .unwrap();

        let channels: Vec<ChannelType> = set.metrics.iter().map(|m| m.channel).collect();
        assert!(channels.contains(&ChannelType::DtcExcludingEmployee));
        assert!(channels.contains(&ChannelType::DtcExcludingEmployeeAndSocial));
        assert!(channels.contains(&ChannelType::CoreBusiness));
        assert!(set.notes.is_empty());
    }
}
