pub mod chart_kind;
pub mod series;
pub mod validation;

pub use chart_kind::ChartKind;
pub use series::{DateRange, FilteredSeries, Periodicity, PricePoint, RawSeries};
pub use validation::ValidationError;
