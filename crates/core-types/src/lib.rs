//! # Meridian Core Types
//!
//! The shared vocabulary of the reporting engine. Every other crate in the
//! workspace speaks in terms of the types defined here.
//!
//! ## Architectural Principles
//!
//! - **Layer 0:** This crate depends on nothing else in the workspace. It
//!   defines data, not behavior.
//! - **Explicit undefinedness:** Every ratio field is an `Option<Decimal>`.
//!   A denominator of zero produces `None`, never a sentinel `0`, so an
//!   undefined conversion rate can never be mistaken for an actual 0%.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{ChannelType, Metric, SubChannel};
pub use error::CoreError;
pub use structs::{DailyRecord, DtcBreakdown, MonthlyMetric, SubChannelMonthly, SubChannelSlice};
