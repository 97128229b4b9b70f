use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::bail;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;
use wrestledraft_ingest::LoadMode;
use wrestledraft_scoring::ScoringConfig;

use wrestledraft_server::report::{detailed, standings_table};
use wrestledraft_server::{AppState, Sources, router};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_ROSTER: &str = "ncaa_wrestling_draft.csv";
const DEFAULT_RESULTS: &str = "wrestling_results.txt";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config();
    info!(
        "roster at {}, results at {} (mode: {:?})",
        config.roster_path.display(),
        config.results_path.display(),
        config.load_mode
    );

    let scoring = match &config.scoring_config {
        Some(path) => {
            info!("using scoring overrides from {}", path.display());
            ScoringConfig::load(path)?
        }
        None => ScoringConfig::default(),
    };
    let sources = Sources {
        roster_path: config.roster_path.clone(),
        results_path: config.results_path.clone(),
        load_mode: config.load_mode,
    };

    if config.report_only {
        let report = sources.score(&scoring);
        print!("{}", standings_table(&report.standings));
        println!();
        print!("{}", detailed(&report));
        if !report.is_complete() {
            bail!("scoring did not complete: {:?}", report.status);
        }
        return Ok(());
    }

    let state = AppState::load(sources, scoring);
    let initial = state.snapshot();
    if initial.is_complete() {
        info!(
            "initial run: {} matches processed, {} winners unmatched",
            initial.summary.matches_processed, initial.summary.matches_missed
        );
    } else {
        warn!("initial run incomplete: {:?}", initial.status);
    }

    info!("binding to {}:{}", config.host, config.port);
    let app = router(state).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("invalid listen address");
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: u16,
    roster_path: PathBuf,
    results_path: PathBuf,
    scoring_config: Option<PathBuf>,
    load_mode: LoadMode,
    report_only: bool,
}

fn load_config() -> Config {
    let mut report_only = false;
    let mut cli_roster: Option<PathBuf> = None;
    let mut cli_results: Option<PathBuf> = None;
    let mut cli_scoring: Option<PathBuf> = None;
    let mut cli_mode: Option<LoadMode> = None;
    let mut args = env::args().skip(1).peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--report" => report_only = true,
            "--roster" => cli_roster = args.next().map(PathBuf::from),
            "--results" => cli_results = args.next().map(PathBuf::from),
            _ => {
                if let Some(path) = arg.strip_prefix("--roster=") {
                    cli_roster = Some(PathBuf::from(path));
                } else if let Some(path) = arg.strip_prefix("--results=") {
                    cli_results = Some(PathBuf::from(path));
                } else if let Some(path) = arg.strip_prefix("--config=") {
                    cli_scoring = Some(PathBuf::from(path));
                } else if let Some(mode) = arg.strip_prefix("--load-mode=") {
                    cli_mode = LoadMode::parse(mode);
                }
            }
        }
    }

    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let roster_path = cli_roster
        .or_else(|| env::var("ROSTER_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ROSTER));
    let results_path = cli_results
        .or_else(|| env::var("RESULTS_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS));
    let scoring_config =
        cli_scoring.or_else(|| env::var("SCORING_CONFIG").ok().map(PathBuf::from));
    let load_mode = cli_mode
        .or_else(|| env::var("LOAD_MODE").ok().as_deref().and_then(LoadMode::parse))
        .unwrap_or(LoadMode::Mmap);

    Config {
        host,
        port,
        roster_path,
        results_path,
        scoring_config,
        load_mode,
        report_only,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
