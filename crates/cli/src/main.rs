use clap::Parser;
use std::path::PathBuf;
use stockviz_core::ingest::AlphaVantageClient;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod prompt;
mod session;

#[derive(Debug, Parser)]
#[command(name = "stockviz_cli", about = "Chart closing prices for a stock symbol")]
struct Args {
    /// Ticker symbol, e.g. AAPL.
    #[arg(long)]
    symbol: Option<String>,

    /// 1|2|3 or daily|weekly|monthly.
    #[arg(long)]
    periodicity: Option<String>,

    /// line or bar.
    #[arg(long)]
    chart: Option<String>,

    /// First date to include (YYYY-MM-DD).
    #[arg(long)]
    start: Option<String>,

    /// Last date to include (YYYY-MM-DD).
    #[arg(long)]
    end: Option<String>,

    /// Directory for the SVG file. Defaults to CHART_OUTPUT_DIR.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Never prompt; reject missing or invalid flags instead.
    #[arg(long)]
    non_interactive: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stockviz_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    // Prompts own stdout; logs go to stderr.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let client = AlphaVantageClient::from_settings(&settings)?;
    let out_dir = args
        .out_dir
        .clone()
        .unwrap_or_else(|| settings.chart_output_dir.clone());

    let inputs = session::Inputs {
        symbol: args.symbol,
        periodicity: args.periodicity,
        chart: args.chart,
        start: args.start,
        end: args.end,
        interactive: !args.non_interactive,
    };

    let stdin = std::io::stdin();
    let mut prompter = prompt::Prompter::new(stdin.lock(), std::io::stdout());

    match session::run(&client, &mut prompter, inputs, &out_dir).await {
        Ok(end) => {
            tracing::debug!(?end, "session finished");
            Ok(())
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            eprintln!("Error: {err}");
            drop(_sentry_guard);
            std::process::exit(1);
        }
    }
}

fn init_sentry(settings: &stockviz_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
