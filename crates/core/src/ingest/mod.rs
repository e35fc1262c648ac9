pub mod alpha_vantage;
pub mod error;
pub mod provider;

pub use alpha_vantage::AlphaVantageClient;
pub use error::FetchError;
pub use provider::SeriesProvider;
