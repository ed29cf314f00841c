use thiserror::Error;

#[derive(Error, Debug)]
pub enum FiscalError {
    #[error("Month {0} is not a valid calendar month")]
    InvalidMonth(u32),

    #[error("{year}-{month:02} does not fall inside fiscal year {fiscal_year}")]
    OutsideFiscalYear {
        fiscal_year: i32,
        year: i32,
        month: u32,
    },
}
