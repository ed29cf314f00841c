//! # Meridian Metric Calculator
//!
//! Pure formulas mapping a month's raw sums to derived ratios: average
//! values, conversion, refund rates. This crate is the single place the
//! formulas live; aggregation, exclusion and YTD accumulation all call
//! [`MetricCalculator::recompute`] after adjusting sums, so a derived
//! channel's ratios can never be built by combining other ratios.
//!
//! ## Division-by-zero policy
//!
//! Every formula whose denominator is zero resolves to `None` ("undefined"),
//! never to an error and never to `0`. Undefinedness propagates untouched
//! through growth and validation.

pub mod calculator;

pub use calculator::{MetricCalculator, within_relative_tolerance};
