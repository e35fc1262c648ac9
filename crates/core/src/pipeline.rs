use crate::chart::{self, ChartArtifact, RenderError, RenderOptions};
use crate::domain::series::parse_date;
use crate::domain::{ChartKind, DateRange, FilteredSeries, Periodicity, ValidationError};
use crate::filter::filter_range;
use crate::ingest::{FetchError, SeriesProvider};
use thiserror::Error;

/// A fully validated chart request. Building one performs every input check,
/// so holding a `ChartRequest` means nothing remains to reject before fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub symbol: String,
    pub periodicity: Periodicity,
    pub kind: ChartKind,
    pub range: DateRange,
}

impl ChartRequest {
    pub fn new(
        symbol: &str,
        periodicity: Periodicity,
        kind: ChartKind,
        range: DateRange,
    ) -> Result<Self, ValidationError> {
        let symbol = normalize_symbol(symbol)?;
        Ok(Self {
            symbol,
            periodicity,
            kind,
            range,
        })
    }

    /// Validates raw text inputs as they arrive from a form or prompt.
    pub fn try_new(
        symbol: &str,
        periodicity: &str,
        kind: &str,
        start: &str,
        end: &str,
    ) -> Result<Self, ValidationError> {
        let symbol = normalize_symbol(symbol)?;
        let kind = kind.parse::<ChartKind>()?;
        let periodicity = periodicity.parse::<Periodicity>()?;
        let start = parse_date("start date", start)?;
        let end = parse_date("end date", end)?;
        let range = DateRange::new(start, end)?;
        Ok(Self {
            symbol,
            periodicity,
            kind,
            range,
        })
    }
}

pub fn normalize_symbol(symbol: &str) -> Result<String, ValidationError> {
    let symbol = symbol.trim().to_ascii_uppercase();
    if symbol.is_empty() {
        return Err(ValidationError::EmptySymbol);
    }
    Ok(symbol)
}

#[derive(Debug)]
pub enum PipelineOutcome {
    Chart {
        artifact: ChartArtifact,
        series: FilteredSeries,
    },
    /// The fetch succeeded but nothing survived filtering.
    NoDataInRange,
}

impl PipelineOutcome {
    pub const NO_DATA_MESSAGE: &'static str = "No data for selected range.";
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl PipelineError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Fetch(err) => err.user_message().to_string(),
            Self::Render(err) => err.user_message(),
        }
    }
}

/// fetch -> filter -> render for one request.
pub async fn run(
    provider: &dyn SeriesProvider,
    request: &ChartRequest,
    opts: &RenderOptions,
) -> Result<PipelineOutcome, PipelineError> {
    let raw = provider
        .fetch_series(&request.symbol, request.periodicity)
        .await
        .map_err(|err| {
            match &err {
                FetchError::Schema { payload, .. } => tracing::warn!(
                    provider = provider.provider_name(),
                    symbol = %request.symbol,
                    error = %err,
                    %payload,
                    "series fetch failed"
                ),
                _ => tracing::warn!(
                    provider = provider.provider_name(),
                    symbol = %request.symbol,
                    error = %err,
                    "series fetch failed"
                ),
            }
            err
        })?;

    let series = filter_range(&raw, &request.range);
    tracing::info!(
        symbol = %request.symbol,
        periodicity = %request.periodicity,
        range = %request.range,
        raw_entries = raw.len(),
        kept = series.len(),
        skipped = series.warnings().len(),
        "filtered series"
    );

    if series.is_empty() {
        return Ok(PipelineOutcome::NoDataInRange);
    }

    let artifact = chart::render_with(&series, &request.symbol, request.kind, opts)?;
    Ok(PipelineOutcome::Chart { artifact, series })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RawSeries;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        calls: AtomicUsize,
        response: fn() -> Result<RawSeries, FetchError>,
    }

    impl StubProvider {
        fn new(response: fn() -> Result<RawSeries, FetchError>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response,
            }
        }
    }

    #[async_trait::async_trait]
    impl SeriesProvider for StubProvider {
        fn provider_name(&self) -> &'static str {
            "stub"
        }

        async fn fetch_series(
            &self,
            _symbol: &str,
            _periodicity: Periodicity,
        ) -> Result<RawSeries, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.response)()
        }
    }

    fn january_series() -> Result<RawSeries, FetchError> {
        Ok(serde_json::from_value(json!({
            "2024-01-03": {"4. close": "150.0"},
            "2024-01-02": {"4. close": "148.5"},
            "2024-01-04": {"4. close": "abc"},
            "2024-01-10": {"4. close": "160.0"}
        }))
        .unwrap())
    }

    fn invalid_symbol() -> Result<RawSeries, FetchError> {
        crate::ingest::alpha_vantage::extract_series("NOPE", json!({"Error Message": "invalid symbol"}))
    }

    fn request(start: &str, end: &str) -> ChartRequest {
        ChartRequest::try_new("aapl", "1", "line", start, end).unwrap()
    }

    #[test]
    fn try_new_normalizes_and_validates() {
        let req = ChartRequest::try_new(" msft ", "Weekly", "B", "2024-01-01", "2024-01-31").unwrap();
        assert_eq!(req.symbol, "MSFT");
        assert_eq!(req.periodicity, Periodicity::Weekly);
        assert_eq!(req.kind, ChartKind::Bar);

        assert_eq!(
            ChartRequest::try_new("  ", "1", "line", "2024-01-01", "2024-01-31"),
            Err(ValidationError::EmptySymbol)
        );
        assert!(matches!(
            ChartRequest::try_new("AAPL", "1", "pie", "2024-01-01", "2024-01-31"),
            Err(ValidationError::UnknownChartKind(_))
        ));
        assert!(matches!(
            ChartRequest::try_new("AAPL", "1", "line", "2024/01/01", "2024-01-31"),
            Err(ValidationError::InvalidDate { .. })
        ));
    }

    #[test]
    fn inverted_range_is_rejected_before_any_fetch() {
        let provider = StubProvider::new(january_series);

        let result = ChartRequest::try_new("AAPL", "1", "line", "2024-02-01", "2024-01-01");
        assert!(matches!(result, Err(ValidationError::InvertedRange { .. })));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn renders_chart_for_data_in_range() {
        let provider = StubProvider::new(january_series);
        let outcome = run(&provider, &request("2024-01-01", "2024-01-05"), &RenderOptions::default())
            .await
            .unwrap();

        match outcome {
            PipelineOutcome::Chart { artifact, series } => {
                assert_eq!(artifact.x_labels(), &["2024-01-02", "2024-01-03"]);
                assert_eq!(series.len(), 2);
                assert_eq!(series.warnings().len(), 1);
            }
            PipelineOutcome::NoDataInRange => panic!("expected a chart"),
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_filter_result_is_no_data_outcome() {
        let provider = StubProvider::new(january_series);
        let outcome = run(&provider, &request("2025-01-01", "2025-01-31"), &RenderOptions::default())
            .await
            .unwrap();
        assert!(matches!(outcome, PipelineOutcome::NoDataInRange));
    }

    #[tokio::test]
    async fn invalid_symbol_propagates_as_fetch_error() {
        let provider = StubProvider::new(invalid_symbol);
        let err = run(&provider, &request("2024-01-01", "2024-01-05"), &RenderOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Fetch(FetchError::InvalidSymbol { .. })));
        assert_eq!(err.user_message(), "Invalid symbol, try another.");
    }
}
