//! # Meridian Exclusion Engine
//!
//! Derives alternate channel views: the direct-to-consumer channel with one
//! or more named sub-channel contributions removed, and the "core business"
//! composite (platform + DTC excluding employee and social).
//!
//! ## The one correctness rule
//!
//! Derived sums are built by field-wise subtraction (or addition, for the
//! composite) of absolute quantities. Ratios are never subtracted or
//! combined across populations; after the sums are adjusted, every ratio is
//! recomputed from scratch through the metric calculator.
//!
//! Each derived channel's construction rule lives in an explicit registry
//! ([`config::derivation_rule`]); there is no string dispatch anywhere.

pub mod config;
pub mod engine;
pub mod error;

pub use config::{DerivationRule, ExclusionConfig, derivation_rule};
pub use engine::{DerivedSet, ExclusionEngine, SubstitutionNote};
pub use error::ExclusionError;
