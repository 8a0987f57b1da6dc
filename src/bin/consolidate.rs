//! Flight table consolidation CLI.
//!
//! Loads a flight booking table snapshot from CSV, groups flights whose
//! departures fall within the configured proximity window, and rewrites the
//! table through the in-memory store.
//!
//! Usage:
//!   consolidate --input table.csv [--config consolidator.toml]
//!               [--output consolidated.csv] [--dry-run] [--json]

use anyhow::{bail, Result};
use log::warn;
use std::env;
use std::path::PathBuf;
use std::process;

use flight_consolidator::config::ConsolidatorConfig;
use flight_consolidator::db::{consolidate_table, FlightRowStore, LocalRepository};
use flight_consolidator::io::{load_table_csv, write_table_csv};
use flight_consolidator::parsing::extract_records;
use flight_consolidator::processing::{ConsolidationPipeline, RunReport};

struct Args {
    input: PathBuf,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    dry_run: bool,
    json: bool,
}

fn print_usage() {
    eprintln!(
        "Usage: consolidate --input <table.csv> [--config <consolidator.toml>] \
         [--output <consolidated.csv>] [--dry-run] [--json]"
    );
}

fn parse_args() -> Result<Args> {
    let mut input = None;
    let mut config = None;
    let mut output = None;
    let mut dry_run = false;
    let mut json = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--input" => input = args.next().map(PathBuf::from),
            "--config" => config = args.next().map(PathBuf::from),
            "--output" => output = args.next().map(PathBuf::from),
            "--dry-run" => dry_run = true,
            "--json" => json = true,
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other => bail!("unknown argument: {}", other),
        }
    }

    let Some(input) = input else {
        print_usage();
        bail!("--input is required");
    };

    Ok(Args {
        input,
        config,
        output,
        dry_run,
        json,
    })
}

fn print_report(report: &RunReport) {
    println!("Rows processed:       {}", report.rows_processed);
    println!("Excluded (bad rows):  {}", report.rows_excluded);
    println!("Superseded, skipped:  {}", report.superseded_skipped);
    println!("Placeholder slots:    {}", report.legs_discarded);
    println!("Groups formed:        {}", report.groups_formed);
    println!("  singleton groups:   {}", report.singleton_groups);
    println!("Inserts emitted:      {}", report.inserts_emitted);
    println!("Updates emitted:      {}", report.updates_emitted);
}

fn main() -> Result<()> {
    env_logger::init();

    let args = parse_args()?;

    let config = match &args.config {
        Some(path) => ConsolidatorConfig::from_file(path)?,
        None => ConsolidatorConfig::from_default_location()?,
    };
    config.repository_type()?;
    let params = config.grouping_params()?;

    let table = load_table_csv(&args.input)?;
    println!(
        "Loaded {} rows from {} (window {}h, capacity {})",
        table.height(),
        args.input.display(),
        params.window_hours,
        params.max_entries
    );

    if args.dry_run {
        let pipeline = ConsolidationPipeline::new(params)?;
        let outcome = pipeline.process(&table)?;
        for exclusion in &outcome.exclusions {
            warn!("excluded from grouping: {}", exclusion);
        }
        if args.json {
            println!("{}", serde_json::to_string_pretty(&outcome.report)?);
        } else {
            print_report(&outcome.report);
        }
        println!("Dry run: no changes applied");
        return Ok(());
    }

    // Seed the in-memory store from the snapshot, then run against it.
    let repo = LocalRepository::new();
    let extraction = extract_records(&table)?;
    for exclusion in &extraction.exclusions {
        warn!("row not seeded: {}", exclusion);
    }
    for record in extraction.records {
        repo.seed_row(record.booking, record.legs)?;
    }

    let summary = consolidate_table(&repo, &params)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_report(&summary.report);
        match summary.apply {
            Some(stats) => println!(
                "Applied: {} consolidated rows inserted, {} originals superseded",
                stats.rows_inserted, stats.rows_updated
            ),
            None => println!("Table already consolidated, nothing applied"),
        }
    }

    if let Some(output) = &args.output {
        let mut consolidated = repo.fetch_snapshot()?;
        write_table_csv(&mut consolidated, output)?;
        println!(
            "Wrote consolidated table ({} rows) to {}",
            consolidated.height(),
            output.display()
        );
    }

    Ok(())
}
