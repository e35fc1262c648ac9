use crate::domain::{Periodicity, RawSeries};
use crate::ingest::FetchError;

#[async_trait::async_trait]
pub trait SeriesProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// One request for `symbol` at `periodicity`; no retries.
    async fn fetch_series(
        &self,
        symbol: &str,
        periodicity: Periodicity,
    ) -> Result<RawSeries, FetchError>;
}
