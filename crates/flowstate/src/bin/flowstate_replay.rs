//! `flowstate-replay`: load a project file and print where it ends up.
//!
//! Usage:
//!   flowstate-replay <project-file> [--config <flowstate.toml>]
//!
//! Accepts `.fss`, `.fsd` and `.fsa` files. Prints the terminal document
//! followed by a one-line-per-record history summary. Set `RUST_LOG` for
//! diagnostics on stderr.

use std::io::{self, Write};
use std::path::PathBuf;

use flowstate::{Store, StoreError};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (project, config) = match parse_args(&args) {
        Some(parsed) => parsed,
        None => {
            eprintln!("Usage: flowstate-replay <project-file> [--config <flowstate.toml>]");
            std::process::exit(1);
        }
    };

    match run(project, config) {
        Ok(output) => {
            if let Err(e) = io::stdout().write_all(output.as_bytes()) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn parse_args(args: &[String]) -> Option<(PathBuf, Option<PathBuf>)> {
    let mut project = None;
    let mut config = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(iter.next()?)),
            _ if project.is_none() => project = Some(PathBuf::from(arg)),
            _ => return None,
        }
    }
    Some((project?, config))
}

fn run(project: PathBuf, config: Option<PathBuf>) -> Result<String, StoreError> {
    let mut store = match config {
        Some(path) => Store::from_config_file(path)?,
        None => Store::new(),
    };
    store.open_project(&project)?;

    let mut out = serde_json::to_string_pretty(store.document()).map_err(flowstate::ProjectError::from)?;
    out.push('\n');
    let history = store.history();
    out.push_str(&format!("history: {} records, current index {}\n", history.len(), history.current_index()));
    for (i, record) in history.records().iter().enumerate() {
        let marker = if i as i64 == history.current_index() { '*' } else { ' ' };
        let names: Vec<&str> = record.gesture.actions.iter().map(|a| a.name()).collect();
        out.push_str(&format!(
            "{marker} {i:>3}  {}  +{} ops  [{}]\n",
            record.diff.timestamp.to_rfc3339(),
            record.diff.forward.len(),
            names.join(", ")
        ));
    }
    Ok(out)
}
