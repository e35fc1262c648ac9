use chrono::NaiveDate;
use thiserror::Error;

/// Input problems caught before any request reaches the provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("symbol must be non-empty")]
    EmptySymbol,

    #[error("{field} {value:?} is not a YYYY-MM-DD date")]
    InvalidDate { field: &'static str, value: String },

    #[error("end date {end} is before start date {start}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("unknown chart kind {0:?}")]
    UnknownChartKind(String),

    #[error("unknown periodicity {0:?}")]
    UnknownPeriodicity(String),

    #[error("symbol {0:?} is not in the stock list")]
    UnknownSymbol(String),
}

impl ValidationError {
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptySymbol => "Please enter a stock symbol.".to_string(),
            Self::InvalidDate { .. } => "Dates must be in YYYY-MM-DD format.".to_string(),
            Self::InvertedRange { .. } => "End date cannot be before start date.".to_string(),
            Self::UnknownChartKind(_) => "Chart type invalid. Please enter 'line' or 'bar'.".to_string(),
            Self::UnknownPeriodicity(_) => {
                "Time series invalid. Choose Daily, Weekly or Monthly.".to_string()
            }
            Self::UnknownSymbol(_) => "Please select a valid symbol.".to_string(),
        }
    }
}
