pub mod chart;
pub mod domain;
pub mod filter;
pub mod ingest;
pub mod pipeline;
pub mod symbols;

pub mod config {
    use anyhow::Context;
    use std::path::PathBuf;
    use std::time::Duration;

    const DEFAULT_PROVIDER_BASE_URL: &str = "https://www.alphavantage.co";
    const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_SYMBOLS_CSV: &str = "static/stocks.csv";
    const DEFAULT_CHART_OUTPUT_DIR: &str = ".";

    /// Process-wide settings, loaded once at startup and passed around by reference.
    #[derive(Debug, Clone)]
    pub struct Settings {
        pub api_key: Option<String>,
        pub provider_base_url: String,
        pub provider_timeout: Duration,
        pub symbols_csv: PathBuf,
        pub chart_output_dir: PathBuf,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let non_empty = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

            let provider_timeout_secs = match non_empty("AV_TIMEOUT_SECS") {
                Some(s) => s
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("AV_TIMEOUT_SECS must be a whole number of seconds (got {s:?})"))?,
                None => DEFAULT_PROVIDER_TIMEOUT_SECS,
            };
            anyhow::ensure!(provider_timeout_secs > 0, "AV_TIMEOUT_SECS must be > 0");

            Ok(Self {
                api_key: non_empty("AV_API_KEY"),
                provider_base_url: non_empty("AV_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_PROVIDER_BASE_URL.to_string()),
                provider_timeout: Duration::from_secs(provider_timeout_secs),
                symbols_csv: non_empty("SYMBOLS_CSV")
                    .unwrap_or_else(|| DEFAULT_SYMBOLS_CSV.to_string())
                    .into(),
                chart_output_dir: non_empty("CHART_OUTPUT_DIR")
                    .unwrap_or_else(|| DEFAULT_CHART_OUTPUT_DIR.to_string())
                    .into(),
                sentry_dsn: non_empty("SENTRY_DSN"),
            })
        }

        pub fn require_api_key(&self) -> anyhow::Result<&str> {
            self.api_key.as_deref().context("AV_API_KEY is required")
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::HashMap;

        fn settings_from(pairs: &[(&str, &str)]) -> anyhow::Result<Settings> {
            let env: HashMap<String, String> = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            Settings::from_lookup(|key| env.get(key).cloned())
        }

        #[test]
        fn applies_defaults_when_unset() {
            let s = settings_from(&[]).unwrap();
            assert_eq!(s.provider_base_url, DEFAULT_PROVIDER_BASE_URL);
            assert_eq!(s.provider_timeout, Duration::from_secs(10));
            assert_eq!(s.symbols_csv, PathBuf::from("static/stocks.csv"));
            assert!(s.api_key.is_none());
            assert!(s.require_api_key().is_err());
        }

        #[test]
        fn blank_values_count_as_unset() {
            let s = settings_from(&[("AV_API_KEY", "  "), ("SENTRY_DSN", "")]).unwrap();
            assert!(s.api_key.is_none());
            assert!(s.sentry_dsn.is_none());
        }

        #[test]
        fn reads_overrides() {
            let s = settings_from(&[
                ("AV_API_KEY", "demo"),
                ("AV_BASE_URL", "http://localhost:9000"),
                ("AV_TIMEOUT_SECS", "3"),
                ("CHART_OUTPUT_DIR", "/tmp/charts"),
            ])
            .unwrap();
            assert_eq!(s.require_api_key().unwrap(), "demo");
            assert_eq!(s.provider_base_url, "http://localhost:9000");
            assert_eq!(s.provider_timeout, Duration::from_secs(3));
            assert_eq!(s.chart_output_dir, PathBuf::from("/tmp/charts"));
        }

        #[test]
        fn rejects_bad_timeout() {
            assert!(settings_from(&[("AV_TIMEOUT_SECS", "soon")]).is_err());
            assert!(settings_from(&[("AV_TIMEOUT_SECS", "0")]).is_err());
        }
    }
}
