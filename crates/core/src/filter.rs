use crate::domain::series::{
    FilterWarning, SkipReason, CLOSE_FIELD_ALIASES, DATE_FORMAT,
};
use crate::domain::{DateRange, FilteredSeries, RawSeries};
use chrono::NaiveDate;
use serde_json::Value;

/// Narrow `raw` to `range`, keeping entries with a usable closing price.
///
/// Never fails. Out-of-range entries are dropped silently; in-range entries
/// with a missing or malformed close are dropped and recorded as warnings.
pub fn filter_range(raw: &RawSeries, range: &DateRange) -> FilteredSeries {
    let mut out = FilteredSeries::new();

    for (date_key, record) in raw {
        if !range.contains_key(date_key) {
            continue;
        }

        let skip = match close_field(record) {
            None => Some(SkipReason::MissingClose),
            Some(v) => match parse_close(v) {
                Err(reason) => Some(reason),
                Ok(close) => match parse_key(date_key) {
                    Some(date) if date >= range.start() && date <= range.end() => {
                        out.insert(date, close);
                        None
                    }
                    Some(_) | None => Some(SkipReason::MalformedDate),
                },
            },
        };

        if let Some(reason) = skip {
            let warning = FilterWarning { date: date_key.clone(), reason };
            tracing::warn!(date = %date_key, warning = %warning, "skipping series entry");
            out.push_warning(warning);
        }
    }

    out
}

/// Only canonical `YYYY-MM-DD` keys count as dates. chrono also accepts
/// unpadded fields, which would sort differently from the date they denote.
fn parse_key(key: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(key, DATE_FORMAT).ok()?;
    (date.format(DATE_FORMAT).to_string() == key).then_some(date)
}

fn close_field(record: &Value) -> Option<&Value> {
    let obj = record.as_object()?;
    CLOSE_FIELD_ALIASES
        .iter()
        .find_map(|key| obj.get(*key))
        .filter(|v| match v {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        })
}

fn parse_close(v: &Value) -> Result<f64, SkipReason> {
    let parsed = match v {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    match parsed {
        Some(close) if close.is_finite() && close >= 0.0 => Ok(close),
        _ => Err(SkipReason::MalformedClose(display_raw(v))),
    }
}

fn display_raw(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
