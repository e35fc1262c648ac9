pub mod artifact;
pub mod render;

pub use crate::domain::chart_kind::is_valid_chart_kind;
pub use artifact::{chart_file_name, ChartArtifact};
pub use render::{render, render_named, render_with, RenderError, RenderOptions};
