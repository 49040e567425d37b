//! Terminal front-end for sift.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use sift::render::{LiveText, format_blocks, render};
use sift::sift_search::{MeiliClient, SearchResultSet};
use sift::{
    AppConfig, ConfigSources, Coordinator, GeminiAdapter, GeminiConfig, SessionEvent,
    SummaryConfig, SummaryState,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Hybrid search with streaming, cited AI summaries.
#[derive(Parser)]
#[command(name = "sift", version, about)]
struct Cli {
    /// TOML file with runtime config overrides (defaults to $SIFT_RUNTIME_CONFIG).
    #[arg(long)]
    runtime_config: Option<PathBuf>,

    /// Do not request AI summaries.
    #[arg(long)]
    no_summary: bool,

    /// Run one query and exit instead of reading queries from stdin.
    query: Option<String>,
}

type App = Coordinator<MeiliClient, GeminiAdapter>;

const EMPHASIS_ON: &str = "\x1b[1;33m";
const EMPHASIS_OFF: &str = "\x1b[0m";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so results on stdout stay clean.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sift=warn,sift_search=warn")),
        )
        .init();

    let cli = Cli::parse();

    let sources = ConfigSources::from_process(cli.runtime_config.as_deref())?;
    let app_config = AppConfig::resolve(&sources);
    let mut summary_config = SummaryConfig::from_sources(&sources);
    if cli.no_summary {
        summary_config.enabled = false;
    }

    let search_config = app_config.search_config();
    let markers = (
        search_config.highlight_pre_tag.clone(),
        search_config.highlight_post_tag.clone(),
    );
    let backend = MeiliClient::new(search_config)?;

    let provider = if summary_config.is_active() {
        Some(GeminiAdapter::new(GeminiConfig::from_summary_config(
            &summary_config,
        )?)?)
    } else {
        tracing::info!("AI summaries disabled");
        None
    };

    let mut app: App = Coordinator::new(
        backend,
        provider,
        Duration::from_secs(summary_config.idle_timeout_secs),
    );

    println!("{}", app_config.app_title);

    let mut live = LiveText::new();
    match cli.query {
        Some(query) => run_once(&mut app, &query, &markers, &mut live).await,
        None => run_interactive(&mut app, &markers, &mut live).await,
    }
}

async fn run_once(
    app: &mut App,
    query: &str,
    markers: &(String, String),
    live: &mut LiveText,
) -> anyhow::Result<()> {
    if app.submit(query).is_none() {
        return Ok(());
    }
    while !app.state().is_settled() {
        match app.next_event().await {
            Some(event) => handle_event(app, event, markers, live),
            None => break,
        }
    }
    Ok(())
}

enum Input {
    Line(Option<String>),
    Event(Option<SessionEvent>),
}

async fn run_interactive(
    app: &mut App,
    markers: &(String, String),
    live: &mut LiveText,
) -> anyhow::Result<()> {
    eprintln!("Type a query and press Enter. `:retry` re-runs a failed summary, `:quit` exits.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let input = tokio::select! {
            line = lines.next_line() => Input::Line(line?),
            event = app.next_event() => Input::Event(event),
        };

        match input {
            Input::Line(None) => break,
            Input::Line(Some(line)) => match line.trim() {
                ":quit" | ":q" => break,
                ":retry" => {
                    if app.retry_summary() {
                        println!("Retrying summary...");
                    } else {
                        println!("Nothing to retry.");
                    }
                }
                _ => {
                    if app.submit(&line).is_some() {
                        println!("Searching for \"{}\"...", line.trim());
                    }
                }
            },
            Input::Event(Some(event)) => handle_event(app, event, markers, live),
            Input::Event(None) => break,
        }
    }
    Ok(())
}

/// Apply an event and print whatever it changed.
///
/// Streaming summaries are echoed as they grow; the finished text is then
/// printed again through the renderer.
fn handle_event(
    app: &mut App,
    event: SessionEvent,
    markers: &(String, String),
    live: &mut LiveText,
) {
    let is_search = matches!(event, SessionEvent::SearchFinished { .. });
    if !app.apply(event) {
        return;
    }

    let state = app.state();
    if is_search {
        live.reset();
        match (&state.error, &state.results) {
            (Some(error), _) => println!("Error: {error}"),
            (None, Some(results)) => print_results(results, markers),
            (None, None) => {}
        }
        if matches!(state.summary, SummaryState::Loading) {
            println!("Summarizing...");
        }
        return;
    }

    match &state.summary {
        SummaryState::Streaming(partial) => {
            if live.is_empty() {
                println!("\n── AI summary (generating...) ──");
            }
            print!("{}", live.delta(partial));
            let _ = std::io::stdout().flush();
        }
        SummaryState::Done(text) => {
            if !live.is_empty() {
                println!("{}", live.delta(text));
            }
            live.reset();
            println!("\n── AI summary ──");
            print!("{}", format_blocks(&render(text)));
        }
        SummaryState::Failed(reason) => {
            if !live.is_empty() {
                println!();
            }
            live.reset();
            println!("\nSummary unavailable: {reason} Type :retry to try again.");
        }
        SummaryState::Loading | SummaryState::Idle => live.reset(),
    }
}

fn print_results(results: &SearchResultSet, markers: &(String, String)) {
    if results.is_empty() {
        println!("No results for \"{}\".", results.query);
        return;
    }

    println!(
        "{} results ({} ms)",
        results.estimated_total_hits, results.processing_time_ms
    );
    for (i, hit) in results.hits.iter().enumerate() {
        let score = hit
            .score_label()
            .map(|label| format!("  [{label}]"))
            .unwrap_or_default();
        println!("\n{:>2}. {}", i + 1, emphasize(&hit.display_title, markers));
        println!("    {}{}{}", hit.source_host, hit.source_path, score);
        println!("    {}", emphasize(&hit.display_excerpt, markers));
        if hit.has_link() {
            println!("    {}", hit.raw_url);
        }
    }
}

/// Swap highlight markers for terminal emphasis.
fn emphasize(text: &str, (pre, post): &(String, String)) -> String {
    if pre.is_empty() || post.is_empty() {
        return text.to_owned();
    }
    text.replace(pre.as_str(), EMPHASIS_ON)
        .replace(post.as_str(), EMPHASIS_OFF)
}
