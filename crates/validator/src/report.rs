use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// How serious a violated check is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// Structural violation; the affected record should not be used.
    Error,
    /// Relational mismatch or identity drift; the record is still usable.
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("ERROR"),
            Severity::Warning => f.write_str("WARNING"),
        }
    }
}

/// One violated check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    /// Where the violation sits, e.g. `2025-06 DTC`.
    pub context: String,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

/// The validator's output: every violated check plus an aggregate quality
/// score (fraction of checks passed).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
    pub checks_run: usize,
    pub checks_passed: usize,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one check that passed.
    pub fn record_pass(&mut self) {
        self.checks_run += 1;
        self.checks_passed += 1;
    }

    /// Records a failed check at error severity.
    pub fn add_error(&mut self, context: impl Into<String>, message: impl Into<String>) {
        self.checks_run += 1;
        self.findings.push(Finding {
            severity: Severity::Error,
            context: context.into(),
            message: message.into(),
        });
    }

    /// Records a failed check at warning severity.
    pub fn add_warning(&mut self, context: impl Into<String>, message: impl Into<String>) {
        self.checks_run += 1;
        self.findings.push(Finding {
            severity: Severity::Warning,
            context: context.into(),
            message: message.into(),
        });
    }

    /// Folds findings produced elsewhere (screening, hierarchy checks,
    /// substitution notes) into this report, counting each as a failed check.
    pub fn absorb(&mut self, findings: impl IntoIterator<Item = Finding>) {
        for finding in findings {
            self.checks_run += 1;
            self.findings.push(finding);
        }
    }

    pub fn error_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .count()
    }

    /// True when no error-severity finding was recorded.
    pub fn is_valid(&self) -> bool {
        self.error_count() == 0
    }

    /// Fraction of checks passed, in `[0, 1]`. An empty report scores 1.
    pub fn quality_score(&self) -> Decimal {
        if self.checks_run == 0 {
            return Decimal::ONE;
        }
        Decimal::from(self.checks_passed as u64) / Decimal::from(self.checks_run as u64)
    }
}
