use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

const SYMBOL_COLUMN: &str = "Symbol";

/// Tickers offered by the web form. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolList {
    symbols: Vec<String>,
}

/// Why a loaded symbol list came back empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolListIssue {
    /// The file could not be opened or its header could not be read.
    Unavailable,
    /// The file has no data rows.
    Empty,
    MissingColumn,
}

impl SymbolListIssue {
    pub fn message(self) -> &'static str {
        match self {
            Self::Unavailable => "Stock list unavailable.",
            Self::Empty => "Stock list is empty.",
            Self::MissingColumn => "Stock list has no Symbol column.",
        }
    }

    /// An empty file is a content problem; the others mean the list is broken.
    pub fn is_failure(self) -> bool {
        !matches!(self, Self::Empty)
    }
}

/// A symbol list plus the issue to report when it degraded to empty.
#[derive(Debug, Clone)]
pub struct SymbolListLoad {
    pub list: SymbolList,
    pub warning: Option<SymbolListIssue>,
}

impl SymbolList {
    pub fn new(symbols: impl IntoIterator<Item = String>) -> Self {
        let mut seen = BTreeSet::new();
        let symbols = symbols
            .into_iter()
            .map(|s| s.trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty())
            .filter(|s| seen.insert(s.clone()))
            .collect();
        Self { symbols }
    }

    /// Never fails: a missing, empty or malformed file yields an empty list and a warning.
    pub fn load(path: &Path) -> SymbolListLoad {
        let file = match std::fs::File::open(path) {
            Ok(f) => f,
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "symbol list not readable");
                return SymbolListLoad::degraded(SymbolListIssue::Unavailable);
            }
        };
        let loaded = Self::from_reader(file);
        if let Some(warning) = &loaded.warning {
            tracing::error!(path = %path.display(), warning = warning.message(), "symbol list degraded");
        } else {
            tracing::info!(path = %path.display(), symbols = loaded.list.len(), "loaded symbol list");
        }
        loaded
    }

    pub fn from_reader<R: Read>(reader: R) -> SymbolListLoad {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let column = match rdr.headers() {
            Ok(headers) if headers.iter().all(|h| h.trim().is_empty()) => {
                return SymbolListLoad::degraded(SymbolListIssue::Empty);
            }
            Ok(headers) => headers.iter().position(|h| h.trim() == SYMBOL_COLUMN),
            Err(err) => {
                tracing::warn!(error = %err, "failed to read symbol list header");
                return SymbolListLoad::degraded(SymbolListIssue::Unavailable);
            }
        };
        let Some(column) = column else {
            return SymbolListLoad::degraded(SymbolListIssue::MissingColumn);
        };

        let mut symbols = Vec::new();
        for (idx, record) in rdr.records().enumerate() {
            match record {
                Ok(record) => {
                    if let Some(v) = record.get(column) {
                        symbols.push(v.to_string());
                    }
                }
                Err(err) => {
                    tracing::warn!(row = idx + 1, error = %err, "skipping unreadable symbol row");
                }
            }
        }

        let list = Self::new(symbols);
        if list.is_empty() {
            return SymbolListLoad::degraded(SymbolListIssue::Empty);
        }
        SymbolListLoad { list, warning: None }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        let wanted = symbol.trim();
        self.symbols.iter().any(|s| s.eq_ignore_ascii_case(wanted))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl SymbolListLoad {
    fn degraded(issue: SymbolListIssue) -> Self {
        Self {
            list: SymbolList::default(),
            warning: Some(issue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_symbol_column_and_skips_blanks() {
        let csv = "Symbol,Name\nAAPL,Apple Inc.\n,Unnamed\nmsft,Microsoft\nAAPL,dup\n";
        let loaded = SymbolList::from_reader(csv.as_bytes());
        assert!(loaded.warning.is_none());
        let symbols: Vec<_> = loaded.list.iter().collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn symbol_column_need_not_be_first() {
        let csv = "Name,Symbol\nInternational Business Machines,IBM\n";
        let loaded = SymbolList::from_reader(csv.as_bytes());
        assert!(loaded.list.contains("ibm"));
    }

    #[test]
    fn empty_file_degrades_with_warning() {
        let loaded = SymbolList::from_reader("".as_bytes());
        assert!(loaded.list.is_empty());
        assert_eq!(loaded.warning, Some(SymbolListIssue::Empty));
        assert!(!SymbolListIssue::Empty.is_failure());
    }

    #[test]
    fn header_only_file_degrades_with_warning() {
        let loaded = SymbolList::from_reader("Symbol\n".as_bytes());
        assert!(loaded.list.is_empty());
        assert_eq!(loaded.warning.map(SymbolListIssue::message), Some("Stock list is empty."));
    }

    #[test]
    fn missing_column_degrades_with_warning() {
        let loaded = SymbolList::from_reader("Ticker\nAAPL\n".as_bytes());
        assert!(loaded.list.is_empty());
        assert_eq!(loaded.warning, Some(SymbolListIssue::MissingColumn));
        assert!(SymbolListIssue::MissingColumn.is_failure());
    }

    #[test]
    fn missing_file_degrades_with_warning() {
        let loaded = SymbolList::load(Path::new("/definitely/not/here/stocks.csv"));
        assert!(loaded.list.is_empty());
        assert_eq!(loaded.warning, Some(SymbolListIssue::Unavailable));
        assert_eq!(SymbolListIssue::Unavailable.message(), "Stock list unavailable.");
        assert!(SymbolListIssue::Unavailable.is_failure());
    }
}
