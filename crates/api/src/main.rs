mod flash;
mod page;

use axum::{
    extract::{Form, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flash::Flash;
use stockviz_core::chart::RenderOptions;
use stockviz_core::domain::ValidationError;
use stockviz_core::ingest::{AlphaVantageClient, FetchError, SeriesProvider};
use stockviz_core::pipeline::{self, ChartRequest, PipelineError, PipelineOutcome};
use stockviz_core::symbols::{SymbolList, SymbolListIssue};

const STOCK_LIST_UNAVAILABLE: &str = "Unable to load stock list.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stockviz_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let provider = AlphaVantageClient::from_settings(&settings)?;
    let loaded = SymbolList::load(&settings.symbols_csv);
    if loaded.warning.is_some() {
        tracing::error!(path = %settings.symbols_csv.display(), "starting web UI without a symbol list");
    }

    let state = AppState {
        provider: Arc::new(provider),
        symbols: Arc::new(loaded.list),
        symbols_issue: loaded.warning,
    };

    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "web UI listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/chart", post(chart))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    provider: Arc<dyn SeriesProvider>,
    symbols: Arc<SymbolList>,
    symbols_issue: Option<SymbolListIssue>,
}

impl AppState {
    fn messages(&self, flashed: Option<Flash>) -> Vec<Flash> {
        let mut messages: Vec<Flash> = self.symbols_issue.map(issue_flash).into_iter().collect();
        messages.extend(flashed);
        messages
    }
}

fn issue_flash(issue: SymbolListIssue) -> Flash {
    if issue.is_failure() {
        Flash::danger(issue.message())
    } else {
        Flash::warning(issue.message())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ChartForm {
    symbol: String,
    chart_type: String,
    time_series: String,
    start_date: String,
    end_date: String,
}

async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let flashed = Flash::from_headers(&headers);
    let consumed = flashed.is_some();
    let html = Html(page::index(&state.symbols, &state.messages(flashed), None));

    if consumed {
        ([(header::SET_COOKIE, Flash::clear_cookie())], html).into_response()
    } else {
        html.into_response()
    }
}

async fn chart(State(state): State<AppState>, Form(form): Form<ChartForm>) -> Response {
    if state.symbols.is_empty() {
        return redirect_with(Flash::danger(STOCK_LIST_UNAVAILABLE));
    }

    let request = match validate(&state.symbols, &form) {
        Ok(request) => request,
        Err(err) => {
            tracing::info!(symbol = %form.symbol, error = %err, "rejected chart form");
            return redirect_with(Flash::danger(err.user_message()));
        }
    };

    match pipeline::run(state.provider.as_ref(), &request, &RenderOptions::default()).await {
        Ok(PipelineOutcome::Chart { artifact, .. }) => {
            let data_uri = artifact.to_data_uri();
            let view = page::ChartView {
                symbol: &request.symbol,
                data_uri: &data_uri,
            };
            Html(page::index(&state.symbols, &state.messages(None), Some(&view))).into_response()
        }
        Ok(PipelineOutcome::NoDataInRange) => {
            redirect_with(Flash::warning(PipelineOutcome::NO_DATA_MESSAGE))
        }
        Err(err) => {
            let message = err.user_message();
            if !matches!(err, PipelineError::Fetch(FetchError::InvalidSymbol { .. })) {
                let err = anyhow::Error::new(err).context(format!("chart for {} failed", request.symbol));
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %format!("{err:#}"), "chart request failed");
            }
            redirect_with(Flash::danger(message))
        }
    }
}

/// Form checks in the order the fields appear; the symbol must come from the loaded list.
fn validate(symbols: &SymbolList, form: &ChartForm) -> Result<ChartRequest, ValidationError> {
    let symbol = pipeline::normalize_symbol(&form.symbol)?;
    if !symbols.contains(&symbol) {
        return Err(ValidationError::UnknownSymbol(symbol));
    }
    ChartRequest::try_new(
        &symbol,
        &form.time_series,
        &form.chart_type,
        &form.start_date,
        &form.end_date,
    )
}

fn redirect_with(flash: Flash) -> Response {
    ([(header::SET_COOKIE, flash.set_cookie())], Redirect::to("/")).into_response()
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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
