//! ddg-typeahead: live search suggestions from the DuckDuckGo Instant Answer API
//!
//! Reads stdin line by line, treating each line as the current content of a
//! search box, and prints suggestion updates as they arrive. With `--once`
//! it runs a single blocking query instead.

use anyhow::Result;
use clap::Parser;
use ddg_typeahead::{
    config::{self, ErrorPolicy, Settings},
    query::ResponseFormat,
    typeahead::{SuggestionUpdate, TextChanged, TypeaheadConfig, TypeaheadPipeline},
    SearchService,
};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ddg-typeahead", version, about)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = config::SETTINGS_PATH_ENV)]
    config: Option<PathBuf>,

    /// Quiet period before a query is issued, in milliseconds
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Minimum trimmed query length
    #[arg(long)]
    min_length: Option<usize>,

    /// Clear the suggestion list when a query fails
    #[arg(long)]
    clear_on_error: bool,

    /// Run one blocking query for TERM and exit
    #[arg(long, value_name = "TERM")]
    once: Option<String>,

    /// With --once, print the raw JSON response
    #[arg(long, requires = "once")]
    raw: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = config::load(cli.config.as_deref())?;
    apply_overrides(&mut settings, &cli);
    settings.validate()?;

    init_logging(&settings);
    info!("Starting ddg-typeahead v{}", ddg_typeahead::VERSION);
    info!(
        endpoint = %settings.api.endpoint,
        secure = settings.api.secure,
        debounce_ms = settings.typeahead.debounce_ms,
        "Configuration loaded"
    );

    match cli.once {
        Some(term) => run_once(settings, term, cli.raw).await,
        None => run_interactive(settings).await,
    }
}

fn apply_overrides(settings: &mut Settings, cli: &Cli) {
    if let Some(ms) = cli.debounce_ms {
        settings.typeahead.debounce_ms = ms;
    }
    if let Some(len) = cli.min_length {
        settings.typeahead.min_query_length = len;
    }
    if cli.clear_on_error {
        settings.typeahead.on_error = ErrorPolicy::Clear;
    }
}

fn init_logging(settings: &Settings) {
    let default_level = if settings.general.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Blocking query, run off the async workers
async fn run_once(settings: Settings, term: String, raw: bool) -> Result<()> {
    let output = tokio::task::spawn_blocking(move || -> Result<String> {
        let service = SearchService::from_settings(&settings.api, &settings.outgoing)?;
        let app_name = settings.api.app_name.as_str();

        if raw {
            return Ok(service.text_query(&term, app_name, ResponseFormat::Json)?);
        }

        let result = service.query(&term, app_name)?;
        let mut lines = Vec::new();
        if let Some(heading) = result.heading.as_deref().filter(|h| !h.is_empty()) {
            lines.push(heading.to_string());
        }
        if let Some(text) = result.abstract_text.as_deref().filter(|t| !t.is_empty()) {
            lines.push(text.to_string());
        }
        for suggestion in result.suggestions() {
            lines.push(format!("  {}  <{}>", suggestion.text, suggestion.uri));
        }
        if lines.is_empty() {
            lines.push("(no instant answer)".to_string());
        }
        Ok(lines.join("\n"))
    })
    .await??;

    println!("{}", output);
    Ok(())
}

/// Each stdin line is the current text of the search box
async fn run_interactive(settings: Settings) -> Result<()> {
    let service = SearchService::from_settings(&settings.api, &settings.outgoing)?;
    let pipeline = TypeaheadPipeline::new(service, TypeaheadConfig::from(&settings.typeahead));
    let mut session = pipeline.start();
    info!("Session {} ready, type a query per line", session.id());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => match line? {
                Some(line) => {
                    session.text_changed(TextChanged::user_input(line));
                }
                None => {
                    input_open = false;
                    session.finish_input();
                }
            },
            update = session.next_update() => match update {
                Some(update) => print_update(&update),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    let snapshot = session.metrics().snapshot();
    info!(
        issued = snapshot.issued,
        delivered = snapshot.delivered,
        superseded = snapshot.superseded,
        errors = snapshot.errors(),
        "Session finished"
    );
    session.dispose().await;
    Ok(())
}

fn print_update(update: &SuggestionUpdate) {
    println!("== {} ({} suggestions)", update.query, update.suggestions.len());
    for suggestion in &update.suggestions {
        println!("  {}  <{}>", suggestion.text, suggestion.uri);
    }
}
