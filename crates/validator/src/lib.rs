//! # Meridian Validator
//!
//! Read-only analysis over a finished monthly output set: structural checks
//! (ranges, non-negativity, buyer/visitor sanity, duplicates) and relational
//! checks (hierarchy sums and ratio identities within tolerance).
//!
//! An `error` finding means the record should not be used downstream; a
//! `warning` means the numbers drifted but the record stands. The validator
//! never mutates its input, and nothing it finds aborts the pipeline.

pub mod engine;
pub mod report;

pub use engine::DataValidator;
pub use report::{Finding, Severity, ValidationReport};
