mod db;
mod error;
mod jsonpuz;
mod parser;
mod puz;
mod record;

use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::{error, warn};

use record::ClueTable;

#[derive(Parser)]
#[command(name = "cryptic_indexer", about = "Parses captured cryptic-crossword blog pages into a clue database")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse unparsed raw captures into clue rows
    Parse {
        /// Only parse captures from this source (e.g. "fifteensquared")
        #[arg(short, long)]
        source: Option<String>,
        /// Only parse captures requested at or after this timestamp
        #[arg(long)]
        since: Option<String>,
        /// Max captures to parse (default: all unparsed)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Import a decoded .puz file (as JSON) and append its clues
    Puz {
        /// Path to the decoded puzzle JSON
        path: String,
        /// Source label to record (e.g. "times_for_the_times")
        #[arg(short, long)]
        source: String,
    },
    /// Per-source parsed/unparsed counts
    Stats,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { source, since, limit } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let pages = db::fetch_unparsed(&conn, source.as_deref(), since.as_deref(), limit)?;
            if pages.is_empty() {
                println!("No unparsed captures.");
                return Ok(());
            }
            println!("Parsing {} captures...", pages.len());
            let counts = parse_captures(&conn, &pages)?;
            counts.print();
            Ok(())
        }
        Commands::Puz { path, source } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let raw = std::fs::read_to_string(&path)?;
            let puzzle: puz::PuzPuzzle = serde_json::from_str(&raw)?;
            let rows = puzzle.to_clue_table(&source, &path)?;
            let n = db::insert_clues(&conn, &rows)?;
            db::insert_raw(&conn, &[(source, path, "puz".to_string(), raw)])?;
            println!("Imported {} clues.", n);
            Ok(())
        }
        Commands::Stats => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let stats = db::get_stats(&conn)?;
            if stats.is_empty() {
                println!("No captures in the database.");
                return Ok(());
            }
            println!(
                "{:<28} | {:>8} | {:>8} | {:>8}",
                "Source", "Parsed", "Pending", "Clues"
            );
            println!("{}", "-".repeat(62));
            let mut total_clues = 0;
            for s in &stats {
                println!(
                    "{:<28} | {:>8} | {:>8} | {:>8}",
                    s.source, s.parsed, s.unparsed, s.clues
                );
                total_clues += s.clues;
            }
            println!("\n{} clues total.", total_clues);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

struct ParseCounts {
    parsed: usize,
    clues: usize,
    unrecognized: usize,
    failed: usize,
}

impl ParseCounts {
    fn print(&self) {
        println!(
            "Parsed {} captures into {} clues ({} unrecognized, {} failed).",
            self.parsed, self.clues, self.unrecognized, self.failed,
        );
    }
}

enum CaptureOutcome {
    Clues(ClueTable),
    Unrecognized,
    Failed(String),
}

fn parse_capture(page: &db::RawPage) -> CaptureOutcome {
    match page.content_type.as_str() {
        "html" => match parser::try_parse(&page.content, &page.location) {
            Ok(Some(rows)) => CaptureOutcome::Clues(rows),
            Ok(None) => CaptureOutcome::Unrecognized,
            Err(err) => CaptureOutcome::Failed(err.to_string()),
        },
        "json" => match jsonpuz::parse_json(&page.content, &page.source, &page.location) {
            Ok(rows) => CaptureOutcome::Clues(rows),
            Err(err) => CaptureOutcome::Failed(err.to_string()),
        },
        "puz" => match serde_json::from_str::<puz::PuzPuzzle>(&page.content)
            .map_err(anyhow::Error::from)
            .and_then(|puzzle| puzzle.to_clue_table(&page.source, &page.location))
        {
            Ok(rows) => CaptureOutcome::Clues(rows),
            Err(err) => CaptureOutcome::Failed(err.to_string()),
        },
        other => CaptureOutcome::Failed(format!("unknown content type {:?}", other)),
    }
}

fn parse_captures(
    conn: &rusqlite::Connection,
    pages: &[db::RawPage],
) -> anyhow::Result<ParseCounts> {
    use indicatif::{ProgressBar, ProgressStyle};
    use rayon::prelude::*;

    let pb = ProgressBar::new(pages.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut counts = ParseCounts {
        parsed: 0,
        clues: 0,
        unrecognized: 0,
        failed: 0,
    };

    for chunk in pages.chunks(500) {
        let results: Vec<_> = chunk
            .par_iter()
            .map(|page| (page.id, &page.location, parse_capture(page)))
            .collect();

        let mut parsed_ids = Vec::new();
        let mut clues = Vec::new();

        for (id, location, outcome) in results {
            match outcome {
                CaptureOutcome::Clues(rows) => {
                    counts.parsed += 1;
                    counts.clues += rows.len();
                    clues.extend(rows);
                    parsed_ids.push(id);
                }
                CaptureOutcome::Unrecognized => {
                    counts.unrecognized += 1;
                    warn!(url = %location, "no shape recognized this page");
                }
                CaptureOutcome::Failed(err) => {
                    counts.failed += 1;
                    error!(url = %location, %err, "failed to parse capture");
                }
            }
        }

        db::insert_clues(conn, &clues)?;
        db::mark_parsed(conn, &parsed_ids)?;
        pb.inc(chunk.len() as u64);
    }

    pb.finish_and_clear();
    Ok(counts)
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
