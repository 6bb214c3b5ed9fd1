//! Chancellor CLI
//!
//! Build a repertoire for one side from an opening explorer and a cloud
//! evaluator, and print the lines worth preparing.

mod line;
mod settings;

use anyhow::{Context, Result};
use chancellor_core::win_rate::{expected_score, expected_win_rate};
use chancellor_core::Variant;
use chancellor_oracle::{CloudEvalClient, ExplorerClient, MoveStatistics};
use chancellor_search::{
    run_query, EventSink, QueryRequest, SearchEngine, SearchEvent, StopSignal,
};
use clap::{Parser, Subcommand, ValueEnum};
use cozy_chess::Color;
use crossbeam_channel::Receiver;
use std::path::PathBuf;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::line::{included_line, parse_line};
use crate::settings::Settings;

/// Progress is printed every this many nodes.
const PROGRESS_EVERY: u64 = 100;

#[derive(Parser, Debug)]
#[command(name = "chancellor", author, version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to ./chancellor.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the opening tree after the given moves
    Query {
        /// Coordinate moves from the starting position, e.g. e2e4 e7e5
        moves: Vec<String>,

        /// Build the repertoire for this side; the opponent's replies become scenarios
        #[arg(long, value_enum)]
        search_for: Option<Side>,

        /// Bearer token for the cloud evaluator
        #[arg(long, env = "LICHESS_TOKEN", hide_env_values = true)]
        token: Option<String>,

        /// Give up after this many seconds
        #[arg(long)]
        time_limit: Option<u64>,

        /// Write the report as JSON to this file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Extra candidate moves at the root
        #[arg(long)]
        root_width: Option<usize>,

        /// Probability below which nodes are no longer expanded
        #[arg(long)]
        stop_at: Option<f64>,

        /// A line of coordinate moves to try first, e.g. "d2d4 d7d5 c2c4"
        #[arg(long = "include", value_name = "LINE")]
        include: Vec<String>,
    },
    /// Print the opening name after the given moves
    Opening {
        moves: Vec<String>,
    },
    /// Convert a White-relative centipawn score into win rates
    Winrate {
        #[arg(allow_hyphen_values = true)]
        centipawns: f64,
        /// Plies played so far
        #[arg(long, default_value_t = 20)]
        ply: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Side {
    White,
    Black,
}

impl From<Side> for Color {
    fn from(side: Side) -> Self {
        match side {
            Side::White => Color::White,
            Side::Black => Color::Black,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Command::Query {
            moves,
            search_for,
            token,
            time_limit,
            report,
            root_width,
            stop_at,
            include,
        } => {
            if token.is_some() {
                settings.oracle.token = token;
            }
            if let Some(extra) = root_width {
                settings.search.width.additional_moves_at_root = extra;
            }
            if let Some(floor) = stop_at {
                settings.search.pruning.stop_at_accumulated_prob = floor;
            }
            let request = QueryRequest {
                moves: parse_line(&moves)?,
                search_for: search_for.map(Color::from),
            };
            let included = include
                .iter()
                .map(String::as_str)
                .map(included_line)
                .collect::<Result<Vec<_>>>()?;
            run(
                settings,
                request,
                included,
                time_limit.map(Duration::from_secs),
                report,
            )
        }
        Command::Opening { moves } => {
            let line = parse_line(&moves)?;
            let explorer = ExplorerClient::from_settings(&settings.oracle)?;
            println!("{}", explorer.fetch_opening_name(&line)?);
            Ok(())
        }
        Command::Winrate { centipawns, ply } => {
            let white = expected_win_rate(centipawns, ply);
            let black = expected_win_rate(-centipawns, ply);
            println!("White wins: {:.1}%", white / 10.0);
            println!("Draws:      {:.1}%", (1000.0 - white - black) / 10.0);
            println!("Black wins: {:.1}%", black / 10.0);
            println!("Expected:   {:.1}%", expected_score(centipawns, ply) / 10.0);
            Ok(())
        }
    }
}

fn run(
    settings: Settings,
    request: QueryRequest,
    included: Vec<Variant>,
    time_limit: Option<Duration>,
    report_path: Option<PathBuf>,
) -> Result<()> {
    let explorer = ExplorerClient::from_settings(&settings.oracle)?;
    let evaluator = CloudEvalClient::from_settings(&settings.oracle)?;
    let (events, receiver) = EventSink::channel();
    let printer = spawn_printer(receiver);

    let engine = SearchEngine::new(explorer, evaluator, settings.search)?
        .with_filters(settings.filters)
        .with_included(included)
        .with_events(events)
        .with_stop(StopSignal::new(time_limit));

    info!(
        moves = request.moves.len(),
        included = engine.included().len(),
        "starting query"
    );
    let report = run_query(&engine, &request);
    let elapsed = engine.stop_signal().elapsed();
    drop(engine);
    printer.join().ok();
    let report = report?;

    report.print_report();
    println!("Finished in {:.1}s", elapsed.as_secs_f64());
    if let Some(path) = report_path {
        report
            .save(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "report written");
    }
    Ok(())
}

/// Print search events to stderr until the engine goes away.
fn spawn_printer(receiver: Receiver<SearchEvent>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut estimated = 0;
        for event in receiver {
            match event {
                SearchEvent::Scenario {
                    index,
                    total,
                    opening,
                    estimated_leaves,
                } => {
                    estimated = estimated_leaves;
                    eprintln!(
                        "[{}/{}] {} ({} leaves estimated)",
                        index + 1,
                        total,
                        opening,
                        estimated_leaves
                    );
                }
                SearchEvent::Progress { visited } if visited % PROGRESS_EVERY == 0 => {
                    eprintln!(
                        "  {visited} nodes visited, about {estimated} leaves in this scenario"
                    );
                }
                _ => {}
            }
        }
    })
}
