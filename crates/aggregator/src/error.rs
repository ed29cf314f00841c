use core_types::ChannelType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregationError {
    #[error("No daily records found for {channel} in {year}-{month:02}")]
    NoData {
        year: i32,
        month: u32,
        channel: ChannelType,
    },

    #[error("Channel {0} is derived and cannot be aggregated from daily records")]
    DerivedChannel(ChannelType),
}
