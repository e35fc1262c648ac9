use crate::domain::ValidationError;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Key the provider uses for the closing price inside each per-day record.
pub const CLOSE_FIELD: &str = "4. close";

/// Spelling seen in older copies of the provider payload; read as a fallback.
pub const CLOSE_FIELD_ALIASES: &[&str] = &[CLOSE_FIELD, "4.close"];

/// Per-day records keyed by the provider's date string, as received.
pub type RawSeries = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Periodicity {
    Daily,
    Weekly,
    Monthly,
}

impl Periodicity {
    pub const ALL: [Periodicity; 3] = [Self::Daily, Self::Weekly, Self::Monthly];

    /// Value of the provider's `function` query parameter.
    pub fn function_name(self) -> &'static str {
        match self {
            Self::Daily => "TIME_SERIES_DAILY",
            Self::Weekly => "TIME_SERIES_WEEKLY",
            Self::Monthly => "TIME_SERIES_MONTHLY",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
        }
    }

    /// Menu numbering used by the interactive CLI (1, 2, 3).
    pub fn from_menu_choice(choice: &str) -> Option<Self> {
        match choice.trim() {
            "1" => Some(Self::Daily),
            "2" => Some(Self::Weekly),
            "3" => Some(Self::Monthly),
            _ => None,
        }
    }
}

impl FromStr for Periodicity {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(p) = Self::from_menu_choice(s) {
            return Ok(p);
        }
        let t = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(t) || p.function_name().eq_ignore_ascii_case(t))
            .ok_or_else(|| ValidationError::UnknownPeriodicity(s.to_string()))
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// Inclusive `[start, end]` interval with `start <= end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
    start_key: String,
    end_key: String,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvertedRange { start, end });
        }
        Ok(Self {
            start,
            end,
            start_key: start.format(DATE_FORMAT).to_string(),
            end_key: end.format(DATE_FORMAT).to_string(),
        })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        let start = parse_date("start date", start)?;
        let end = parse_date("end date", end)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// ISO-8601 date strings sort the same way the dates do, so raw keys are
    /// compared without parsing.
    pub fn contains_key(&self, key: &str) -> bool {
        self.start_key.as_str() <= key && key <= self.end_key.as_str()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start_key, self.end_key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    MissingClose,
    MalformedClose(String),
    MalformedDate,
}

/// An in-range entry that was dropped while filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterWarning {
    pub date: String,
    pub reason: SkipReason,
}

impl fmt::Display for FilterWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            SkipReason::MissingClose => write!(f, "missing close price for {}", self.date),
            SkipReason::MalformedClose(v) => {
                write!(f, "invalid close price {v:?} for {}", self.date)
            }
            SkipReason::MalformedDate => write!(f, "{:?} is not a calendar date", self.date),
        }
    }
}

/// Closing prices by date, restricted to a range, plus what was skipped on the way.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilteredSeries {
    points: BTreeMap<NaiveDate, f64>,
    warnings: Vec<FilterWarning>,
}

impl FilteredSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, date: NaiveDate, close: f64) {
        self.points.insert(date, close);
    }

    pub(crate) fn push_warning(&mut self, warning: FilterWarning) {
        self.warnings.push(warning);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points.get(&date).copied()
    }

    pub fn points(&self) -> impl Iterator<Item = PricePoint> + '_ {
        self.points
            .iter()
            .map(|(date, close)| PricePoint { date: *date, close: *close })
    }

    pub fn warnings(&self) -> &[FilterWarning] {
        &self.warnings
    }

    pub fn same_points(&self, other: &FilteredSeries) -> bool {
        self.points == other.points
    }

    /// Re-encode in the provider's record shape.
    pub fn to_raw_series(&self) -> RawSeries {
        self.points
            .iter()
            .map(|(date, close)| {
                let record = serde_json::Map::from_iter([(
                    CLOSE_FIELD.to_string(),
                    Value::String(close.to_string()),
                )]);
                (date.format(DATE_FORMAT).to_string(), Value::Object(record))
            })
            .collect()
    }
}

impl FromIterator<PricePoint> for FilteredSeries {
    fn from_iter<I: IntoIterator<Item = PricePoint>>(iter: I) -> Self {
        let mut out = Self::new();
        for p in iter {
            out.insert(p.date, p.close);
        }
        out
    }
}
