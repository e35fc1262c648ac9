use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider could not be reached, or answered with a non-success status.
    #[error("provider transport error (status={status:?}): {detail}")]
    Transport { status: Option<u16>, detail: String },

    /// The provider answered with its explicit error envelope for this symbol.
    #[error("provider rejected symbol {symbol}: {message}")]
    InvalidSymbol { symbol: String, message: String },

    /// The response had neither a time-series payload nor an error envelope.
    /// `payload` is kept for diagnostics only.
    #[error("unrecognized provider response: {detail}")]
    Schema { detail: String, payload: Value },
}

impl FetchError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "Could not reach the data provider.",
            Self::InvalidSymbol { .. } => "Invalid symbol, try another.",
            Self::Schema { .. } => "Unexpected response from the data provider.",
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }

    pub fn raw_payload(&self) -> Option<&Value> {
        match self {
            Self::Schema { payload, .. } => Some(payload),
            _ => None,
        }
    }
}
