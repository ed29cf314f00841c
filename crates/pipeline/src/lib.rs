//! # Pipeline Crate
//!
//! The end-to-end reporting run: screen the daily input, aggregate it into
//! monthly per-channel results, derive the exclusion variants and the core
//! business composite, annotate growth and fiscal context, accumulate
//! year-to-date rollups, and validate the whole set.
//!
//! ## Architectural Principles
//!
//! - **One pass, one output.** `run` consumes the daily records once and
//!   returns everything the presentation layer needs.
//! - **Degrade, don't abort.** Bad daily rows and arithmetic drift become
//!   findings in the validation report; only structural impossibilities
//!   (a mis-wired derivation) surface as errors.

use crate::error::PipelineError;
use aggregator::{ChannelAggregator, HierarchyRule};
use configuration::Settings;
use core_types::{ChannelType, DailyRecord, MonthlyMetric, SubChannel, SubChannelMonthly};
use exclusion::ExclusionEngine;
use fiscal::FiscalYearCalculator;
use growth::GrowthCalculator;
use std::collections::BTreeSet;
use tracing::info;
use validator::{DataValidator, ValidationReport};

pub mod error;

/// Everything one reporting run produces.
#[derive(Debug)]
pub struct PipelineOutput {
    /// Monthly results, ordered by (year, month, channel), one entry per key.
    pub monthly: Vec<MonthlyMetric>,
    /// Fiscal year-to-date rollups through the latest period in the input,
    /// one per reported channel that has data in the window.
    pub ytd: Vec<MonthlyMetric>,
    /// The consolidated validation report for the run.
    pub report: ValidationReport,
}

/// The main reporting engine. Owns one instance of every calculation
/// component and wires them together in the order the data flows.
pub struct ReportingPipeline {
    settings: Settings,
    aggregator: ChannelAggregator,
    exclusion: ExclusionEngine,
    growth: GrowthCalculator,
    fiscal: FiscalYearCalculator,
}

impl ReportingPipeline {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            aggregator: ChannelAggregator::new(),
            exclusion: ExclusionEngine::new(),
            growth: GrowthCalculator::new(),
            fiscal: FiscalYearCalculator::new(),
        }
    }

    /// Runs the full reporting pass over the daily records.
    pub fn run(&self, records: &[DailyRecord]) -> Result<PipelineOutput, PipelineError> {
        let tolerance = self.settings.validation.relative_tolerance;
        let validator = DataValidator::new(tolerance);

        // 1. Screen the daily input. Rejected rows become findings and are
        //    kept out of every downstream sum.
        let (clean, screening) = validator.screen_daily(records);

        // 2. Aggregate the base channels for every period present.
        let mut monthly = self.aggregator.aggregate_all(&clean, &ChannelType::BASE);

        // 3. Derive the requested exclusion variants and composites, period
        //    by period, from the aggregated sums.
        let config = self.settings.exclusion.to_config();
        let periods: BTreeSet<(i32, u32)> = monthly.iter().map(|m| (m.year, m.month)).collect();
        let mut derived = Vec::new();
        let mut notes = Vec::new();
        for &(year, month) in &periods {
            let find = |channel| {
                monthly
                    .iter()
                    .find(|m| m.channel == channel && m.year == year && m.month == month)
            };
            let contributions: Vec<SubChannelMonthly> = SubChannel::ALL
                .iter()
                .map(|&sub| self.aggregator.sub_channel_month(&clean, year, month, sub))
                .collect();
            let set = self.exclusion.derive_all(
                find(ChannelType::Platform),
                find(ChannelType::DirectToConsumer),
                &contributions,
                &config,
            )?;
            derived.extend(set.metrics);
            notes.extend(set.notes);
        }
        monthly.extend(derived);
        monthly.sort_by_key(|m| (m.year, m.month, m.channel));

        // 4. Annotate channel shares, growth and fiscal context across the
        //    full series, derived channels included.
        self.aggregator.annotate_net_share(&mut monthly);
        self.growth.annotate(&mut monthly);
        self.fiscal.annotate(&mut monthly);

        // 5. Accumulate year-to-date rollups through the latest period.
        let mut ytd = Vec::new();
        if let Some(&(year, month)) = periods.iter().next_back() {
            let fy = fiscal::fiscal_year_of(year, month);
            for &channel in &self.settings.report.channels {
                if let Some(rollup) =
                    self.fiscal.accumulate_ytd(&monthly, channel, fy, year, month)?
                {
                    ytd.push(rollup);
                }
            }
            // Year-to-date entries all target the same period, so shares are
            // computed against the TOTAL rollup the same way.
            self.aggregator.annotate_net_share(&mut ytd);
        }

        // 6. Validate the monthly set and fold in everything noteworthy the
        //    earlier stages produced.
        let mut report = validator.validate(&monthly);
        report.absorb(screening);
        for mismatch in self
            .aggregator
            .validate_hierarchy(&clean, &monthly, tolerance)
            .into_iter()
            // The monthly-set validator already covers the TOTAL net rule.
            .filter(|m| m.rule != HierarchyRule::TotalVsParts)
        {
            report.add_warning(format!("{}-{:02}", mismatch.year, mismatch.month), mismatch.to_string());
        }
        for note in &notes {
            report.add_warning(format!("{}-{:02}", note.year, note.month), note.to_string());
        }

        info!(
            months = monthly.len(),
            ytd = ytd.len(),
            errors = report.error_count(),
            warnings = report.warning_count(),
            score = %report.quality_score(),
            "reporting run complete"
        );

        Ok(PipelineOutput {
            monthly,
            ytd,
            report,
        })
    }
}
