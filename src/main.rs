//! `persisql [--config <base>] <sql | select-json>`
//!
//! Runs one SELECT against the configured database and prints the folded
//! records as JSON. A JSON object argument is decoded as a multi-row select
//! request (`table`, `conditions`, `joins`, `grouping`, `orderBy`, `cols`).

use std::process::ExitCode;

use persisql::{ConnectionSettings, Engine, Outcome, RawSql, Result, SelectMany};
use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "persisql";
const USAGE: &str = "usage: persisql [--config <base>] <sql | select-json>";

fn run(config: &str, query: &str) -> Result<()> {
    let settings = ConnectionSettings::load(config)?;
    let engine = Engine::connect(&settings)?;
    let outcome = if query.trim_start().starts_with('{') {
        let select: SelectMany = serde_json::from_str(query)?;
        engine.get_all(&select)?
    } else {
        engine.get_all_base(&RawSql::trusted(query), false)?
    };
    match outcome {
        Outcome::Debug(sql) => println!("{sql}"),
        Outcome::Executed(records) => println!("{}", serde_json::to_string_pretty(&records)?),
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("persisql=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let mut config = DEFAULT_CONFIG.to_string();
    let mut query = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => match args.next() {
                Some(base) => config = base,
                None => {
                    eprintln!("{USAGE}");
                    return ExitCode::FAILURE;
                }
            },
            _ => query = Some(arg),
        }
    }
    let Some(query) = query else {
        eprintln!("{USAGE}");
        return ExitCode::FAILURE;
    };

    match run(&config, &query) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "query failed");
            ExitCode::FAILURE
        }
    }
}
