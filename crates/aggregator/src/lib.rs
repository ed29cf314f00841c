//! # Meridian Channel Aggregator
//!
//! Groups daily records into monthly per-channel sums and checks the channel
//! hierarchy arithmetic (TOTAL = PLATFORM + DTC, DTC = sum of its
//! sub-channels) within a configurable relative tolerance.
//!
//! Hierarchy mismatches are reported, never raised: a month whose books
//! disagree by more than the tolerance still produces output, it just
//! arrives with a warning attached.

pub mod engine;
pub mod error;
pub mod hierarchy;

pub use engine::ChannelAggregator;
pub use error::AggregationError;
pub use hierarchy::{HierarchyMismatch, HierarchyRule};
