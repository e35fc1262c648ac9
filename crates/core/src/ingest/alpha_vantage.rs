use crate::config::Settings;
use crate::domain::{Periodicity, RawSeries};
use crate::ingest::{FetchError, SeriesProvider};
use anyhow::Context;
use serde_json::{Map, Value};

const QUERY_PATH: &str = "/query";
const SERIES_KEY_MARKER: &str = "Time Series";
const ERROR_KEY: &str = "Error Message";
const NOTICE_KEYS: &[&str] = &["Note", "Information"];

#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let api_key = settings.require_api_key()?.to_string();

        let http = reqwest::Client::builder()
            .timeout(settings.provider_timeout)
            .build()
            .context("failed to build provider http client")?;

        Ok(Self {
            http,
            base_url: settings.provider_base_url.clone(),
            api_key,
        })
    }

    fn url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), QUERY_PATH)
    }
}

#[async_trait::async_trait]
impl SeriesProvider for AlphaVantageClient {
    fn provider_name(&self) -> &'static str {
        "alpha_vantage"
    }

    async fn fetch_series(
        &self,
        symbol: &str,
        periodicity: Periodicity,
    ) -> Result<RawSeries, FetchError> {
        let params = [
            ("function", periodicity.function_name()),
            ("symbol", symbol),
            ("apikey", self.api_key.as_str()),
            ("datatype", "json"),
        ];

        let res = self
            .http
            .get(self.url())
            .query(&params)
            .send()
            .await
            .map_err(|err| FetchError::Transport {
                status: err.status().map(|s| s.as_u16()),
                detail: err.without_url().to_string(),
            })?;

        let status = res.status();
        let text = res.text().await.map_err(|err| FetchError::Transport {
            status: Some(status.as_u16()),
            detail: format!("failed to read provider response: {}", err.without_url()),
        })?;

        let series = classify_response(symbol, status, text)?;
        tracing::debug!(%symbol, %periodicity, entries = series.len(), "fetched time series");
        Ok(series)
    }
}

/// Map an HTTP status and body to a raw series or a fetch error.
pub fn classify_response(
    symbol: &str,
    status: reqwest::StatusCode,
    text: String,
) -> Result<RawSeries, FetchError> {
    if !status.is_success() {
        tracing::warn!(%symbol, http_status = %status, "provider returned non-success status");
        return Err(FetchError::Transport {
            status: Some(status.as_u16()),
            detail: format!("provider HTTP {status}"),
        });
    }

    let payload = match serde_json::from_str::<Value>(&text) {
        Ok(v) => v,
        Err(err) => {
            return Err(FetchError::Schema {
                detail: format!("response is not valid JSON: {err}"),
                payload: Value::String(text),
            })
        }
    };

    extract_series(symbol, payload)
}

/// Key of the series payload: the one whose name contains "Time Series"
/// (e.g. "Time Series (Daily)", "Weekly Time Series").
pub fn find_series_key(body: &Map<String, Value>) -> Option<&str> {
    body.keys()
        .map(String::as_str)
        .find(|k| k.contains(SERIES_KEY_MARKER))
}

/// Classify a decoded provider response into a raw series or a fetch error.
pub fn extract_series(symbol: &str, payload: Value) -> Result<RawSeries, FetchError> {
    let Value::Object(mut body) = payload else {
        return Err(FetchError::Schema {
            detail: "response is not a JSON object".to_string(),
            payload,
        });
    };

    if let Some(message) = body.get(ERROR_KEY) {
        let message = match message {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(FetchError::InvalidSymbol {
            symbol: symbol.to_string(),
            message,
        });
    }

    let Some(key) = find_series_key(&body).map(str::to_string) else {
        if let Some(notice) = NOTICE_KEYS.iter().find_map(|k| body.get(*k)) {
            tracing::warn!(%symbol, %notice, "provider returned a notice instead of data");
        }
        return Err(FetchError::Schema {
            detail: format!("no key containing {SERIES_KEY_MARKER:?}"),
            payload: Value::Object(body),
        });
    };

    match body.remove(&key) {
        Some(Value::Object(series)) => Ok(series.into_iter().collect()),
        other => {
            if let Some(v) = other {
                body.insert(key.clone(), v);
            }
            Err(FetchError::Schema {
                detail: format!("{key:?} is not an object"),
                payload: Value::Object(body),
            })
        }
    }
}
