use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Channel derivation failed: {0}")]
    Exclusion(#[from] exclusion::ExclusionError),

    #[error("Fiscal accumulation failed: {0}")]
    Fiscal(#[from] fiscal::FiscalError),
}
