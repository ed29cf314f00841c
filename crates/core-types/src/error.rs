use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unknown channel: '{0}'")]
    UnknownChannel(String),

    #[error("Unknown sub-channel: '{0}'")]
    UnknownSubChannel(String),
}
