//! sqlfs: query your file system using SQL.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{OutputFormat, QueryOptions};

const AFTER_HELP: &str = "\
Example:
    sqlfs \"SELECT * FROM ~/ WHERE extension = 'sh'\"

Columns available:
    owner       - file owner
    group       - file group
    filesize    - file size in bytes
    createdt    - file creation time
    lastmod     - last modified time
    name        - file name
    extension   - file extension
    path        - file path
    permission  - mode string, e.g. -rw-r--r-- (not part of *)
    links       - hard link count (not part of *)
    type        - file, directory or symlink (not part of *)
    *           - path, lastmod, createdt, owner, group, name, extension, filesize

Operators: =  !=  <  <=  >  >=  LIKE ('%' matches any run of characters)
Only the first WHERE condition is applied.";

#[derive(Parser)]
#[command(name = "sqlfs")]
#[command(about = "Query your file system using SQL")]
#[command(version)]
#[command(after_help = AFTER_HELP)]
struct Cli {
    /// Query, e.g. "SELECT name, filesize FROM ~/ WHERE extension = 'sh'"
    query: String,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Config file (default: $SQLFS_CONFIG, then the user config directory)
    #[arg(long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the parsed query without reading the filesystem
    #[arg(long = "explain")]
    explain: bool,

    /// Log diagnostics to stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let opts = QueryOptions {
        format: cli.format,
        config_path: cli.config,
        explain: cli.explain,
    };

    if let Err(e) = commands::query(&cli.query, &opts) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
