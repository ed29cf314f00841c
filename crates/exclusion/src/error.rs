use core_types::ChannelType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExclusionError {
    #[error("Channel {0} has no derivation rule")]
    NotDerivable(ChannelType),

    #[error("Channel {0} is a composite; derive it via core_business")]
    Composite(ChannelType),

    #[error(
        "Period mismatch between composite inputs: {left_year}-{left_month:02} vs {right_year}-{right_month:02}"
    )]
    PeriodMismatch {
        left_year: i32,
        left_month: u32,
        right_year: i32,
        right_month: u32,
    },

    #[error("Expected {expected} as the base for this derivation, got {found}")]
    WrongBase {
        expected: ChannelType,
        found: ChannelType,
    },
}
