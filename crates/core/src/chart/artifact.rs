use crate::domain::{ChartKind, DateRange};
use anyhow::Context;
use base64::Engine;
use std::path::{Path, PathBuf};

const SVG_DATA_URI_PREFIX: &str = "data:image/svg+xml;charset=utf-8;base64,";

/// A rendered SVG chart and the x-axis categories it was drawn with.
#[derive(Debug, Clone)]
pub struct ChartArtifact {
    pub(crate) kind: ChartKind,
    pub(crate) svg: String,
    pub(crate) x_labels: Vec<String>,
}

impl ChartArtifact {
    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Dates on the x-axis, ascending.
    pub fn x_labels(&self) -> &[String] {
        &self.x_labels
    }

    /// Inline form for embedding in an `<img src=...>`.
    pub fn to_data_uri(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(self.svg.as_bytes());
        format!("{SVG_DATA_URI_PREFIX}{encoded}")
    }

    /// Writes the SVG into `dir` under the conventional file name and returns the path.
    pub fn write_to_dir(
        &self,
        dir: &Path,
        symbol: &str,
        range: &DateRange,
    ) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output dir {}", dir.display()))?;
        let path = dir.join(chart_file_name(symbol, range));
        std::fs::write(&path, &self.svg)
            .with_context(|| format!("failed to write chart to {}", path.display()))?;
        Ok(path)
    }
}

pub fn chart_file_name(symbol: &str, range: &DateRange) -> String {
    let symbol: String = symbol
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("{symbol}_{}_to_{}_chart.svg", range.start(), range.end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(svg: &str) -> ChartArtifact {
        ChartArtifact {
            kind: ChartKind::Line,
            svg: svg.to_string(),
            x_labels: vec!["2024-01-02".to_string()],
        }
    }

    #[test]
    fn file_name_follows_convention() {
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        assert_eq!(
            chart_file_name("AAPL", &range),
            "AAPL_2024-01-01_to_2024-01-31_chart.svg"
        );
        assert_eq!(
            chart_file_name("BRK/B", &range),
            "BRK_B_2024-01-01_to_2024-01-31_chart.svg"
        );
    }

    #[test]
    fn data_uri_round_trips_svg_bytes() {
        let a = artifact("<svg>ok</svg>");
        let uri = a.to_data_uri();
        let encoded = uri.strip_prefix(SVG_DATA_URI_PREFIX).unwrap();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        assert_eq!(decoded, b"<svg>ok</svg>");
    }

    #[test]
    fn writes_file_under_dir() {
        let dir = std::env::temp_dir().join(format!("stockviz-artifact-{}", std::process::id()));
        let range = DateRange::parse("2024-01-01", "2024-01-05").unwrap();
        let path = artifact("<svg/>").write_to_dir(&dir, "IBM", &range).unwrap();
        assert_eq!(path, dir.join("IBM_2024-01-01_to_2024-01-05_chart.svg"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<svg/>");
        let _ = std::fs::remove_dir_all(&dir);
    }
}
