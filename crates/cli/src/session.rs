use crate::prompt::Prompter;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use stockviz_core::chart::RenderOptions;
use stockviz_core::domain::series::parse_date;
use stockviz_core::domain::{ChartKind, DateRange, Periodicity, ValidationError};
use stockviz_core::ingest::{FetchError, SeriesProvider};
use stockviz_core::pipeline::{self, normalize_symbol, ChartRequest, PipelineError, PipelineOutcome};

const SYMBOL_QUESTION: &str = "Enter stock symbol (e.g., AAPL, TSLA): ";
const PERIODICITY_MENU: &str =
    "\nChoose a time series function:\n1. Daily\n2. Weekly\n3. Monthly";
const PERIODICITY_QUESTION: &str = "Enter your choice (1, 2, or 3): ";
const CHART_QUESTION: &str = "Enter chart type (line/bar): ";
const START_QUESTION: &str = "Enter start date (YYYY-MM-DD): ";
const END_QUESTION: &str = "Enter end date (YYYY-MM-DD): ";

/// Values supplied on the command line; anything missing is asked for.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub symbol: Option<String>,
    pub periodicity: Option<String>,
    pub chart: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub interactive: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SessionEnd {
    Saved(PathBuf),
    NoData,
}

pub async fn run<R: BufRead, W: Write>(
    provider: &dyn SeriesProvider,
    prompter: &mut Prompter<R, W>,
    inputs: Inputs,
    out_dir: &Path,
) -> anyhow::Result<SessionEnd> {
    let interactive = inputs.interactive;

    let mut symbol = resolve(
        prompter,
        inputs.symbol,
        interactive,
        "--symbol",
        SYMBOL_QUESTION,
        normalize_symbol,
    )?;
    let periodicity = resolve_periodicity(prompter, inputs.periodicity, interactive)?;
    let kind = resolve(
        prompter,
        inputs.chart,
        interactive,
        "--chart",
        CHART_QUESTION,
        |s: &str| s.parse::<ChartKind>(),
    )?;
    let range = resolve_range(prompter, inputs.start, inputs.end, interactive)?;

    loop {
        let request = ChartRequest::new(&symbol, periodicity, kind, range.clone())
            .map_err(|e| anyhow::anyhow!(e.user_message()))?;
        let render_opts = RenderOptions {
            title: Some(format!("{} Stock Prices", request.symbol)),
            ..Default::default()
        };

        match pipeline::run(provider, &request, &render_opts).await {
            Ok(PipelineOutcome::Chart { artifact, .. }) => {
                let path = artifact.write_to_dir(out_dir, &request.symbol, &request.range)?;
                prompter.say(&format!(
                    "Chart saved as '{}'. Open in a browser to view.",
                    path.display()
                ))?;
                return Ok(SessionEnd::Saved(path));
            }
            Ok(PipelineOutcome::NoDataInRange) => {
                prompter.say(PipelineOutcome::NO_DATA_MESSAGE)?;
                return Ok(SessionEnd::NoData);
            }
            Err(PipelineError::Fetch(
                err @ (FetchError::InvalidSymbol { .. } | FetchError::Schema { .. }),
            )) if interactive => {
                prompter.say(err.user_message())?;
                prompter.say("Please enter a valid stock symbol.")?;
                symbol = prompter.ask_until(SYMBOL_QUESTION, normalize_symbol)?;
            }
            Err(err) => anyhow::bail!(err.user_message()),
        }
    }
}

/// Use `preset` if it parses; otherwise ask (interactive) or fail (non-interactive).
fn resolve<R: BufRead, W: Write, T>(
    prompter: &mut Prompter<R, W>,
    preset: Option<String>,
    interactive: bool,
    flag: &str,
    question: &str,
    parse: impl Fn(&str) -> Result<T, ValidationError>,
) -> anyhow::Result<T> {
    match preset {
        Some(v) => match parse(&v) {
            Ok(t) => return Ok(t),
            Err(err) if !interactive => anyhow::bail!("{flag}: {}", err.user_message()),
            Err(err) => prompter.say(&err.user_message())?,
        },
        None if !interactive => anyhow::bail!("{flag} is required with --non-interactive"),
        None => {}
    }
    prompter.ask_until(question, parse)
}

/// An unrecognized menu choice falls back to daily rather than failing.
fn resolve_periodicity<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    preset: Option<String>,
    interactive: bool,
) -> anyhow::Result<Periodicity> {
    let choice = match preset {
        Some(v) => v,
        None if !interactive => return Ok(Periodicity::Daily),
        None => {
            prompter.say(PERIODICITY_MENU)?;
            prompter.ask(PERIODICITY_QUESTION)?
        }
    };

    match choice.parse::<Periodicity>() {
        Ok(p) => Ok(p),
        Err(err) if !interactive => anyhow::bail!("--periodicity: {}", err.user_message()),
        Err(_) => {
            tracing::warn!(%choice, "unknown periodicity choice; using daily");
            prompter.say("Invalid input, defaulting to daily.")?;
            Ok(Periodicity::Daily)
        }
    }
}

fn resolve_range<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    start: Option<String>,
    end: Option<String>,
    interactive: bool,
) -> anyhow::Result<DateRange> {
    let mut start = start;
    let mut end = end;
    loop {
        let start_date = resolve(
            prompter,
            start.take(),
            interactive,
            "--start",
            START_QUESTION,
            |s: &str| parse_date("start date", s),
        )?;
        let end_date = resolve(
            prompter,
            end.take(),
            interactive,
            "--end",
            END_QUESTION,
            |s: &str| parse_date("end date", s),
        )?;

        match DateRange::new(start_date, end_date) {
            Ok(range) => return Ok(range),
            Err(err) if !interactive => anyhow::bail!(err.user_message()),
            Err(err) => prompter.say(&err.user_message())?,
        }
    }
}
