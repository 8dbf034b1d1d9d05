//! CLI command implementations.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::ValueEnum;
use sqfs::{parse_query, sources_line, to_json, Config, Engine, Query, Table};

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns with a header row
    Table,
    /// JSON array of objects
    Json,
}

pub struct QueryOptions {
    pub format: OutputFormat,
    pub config_path: Option<PathBuf>,
    pub explain: bool,
}

fn load_config(path: Option<&std::path::Path>) -> sqfs::Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Parse, execute and print a query.
pub fn query(query_str: &str, opts: &QueryOptions) -> sqfs::Result<()> {
    let query = parse_query(query_str)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if opts.explain {
        return explain(&mut out, &query);
    }

    let config = load_config(opts.config_path.as_deref())?;
    let engine = Engine::local(config);
    let result = engine.execute(&query)?;
    let config = engine.config();

    match opts.format {
        OutputFormat::Table => {
            if config.show_sources {
                writeln!(out, "{}", sources_line(&result.sources))?;
            }
            let table = Table::new(&result.columns, &result.entries, config);
            write!(out, "{}", table.render())?;
        }
        OutputFormat::Json => {
            let json = to_json(&result.columns, &result.entries, config);
            serde_json::to_writer_pretty(&mut out, &json).map_err(io::Error::from)?;
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Describe a parsed query without touching the filesystem.
fn explain(out: &mut impl Write, query: &Query) -> sqfs::Result<()> {
    let columns: Vec<&str> = query.columns()?.iter().map(|c| c.name()).collect();
    let paths: Vec<&str> = query.paths.iter().map(|p| p.raw.as_str()).collect();

    writeln!(out, "{}", query)?;
    writeln!(out, "columns: {}", columns.join(", "))?;
    writeln!(out, "sources: {}", paths.join(", "))?;
    match query.active_condition() {
        Some(condition) => writeln!(out, "filter:  {}", condition)?,
        None => writeln!(out, "filter:  (none)")?,
    }
    for condition in query.ignored_conditions() {
        writeln!(out, "ignored: {} (only the first condition is applied)", condition)?;
    }
    Ok(())
}
