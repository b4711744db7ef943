//! oxide-adql CLI
//!
//! Checks ADQL queries read from files or stdin. Syntax errors go to stderr
//! as `file:line:column: message`; the parsed tree can be printed back as
//! SQL, JSON or a debug tree.

mod error;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_adql_core::ast::{ColumnCollector, ConstantFolder, Fold, Query};
use oxide_adql_core::{try_parse_with, ParserConfig};

use crate::error::CliError;

/// How to print a successfully parsed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Canonical ADQL text.
    Sql,
    /// The syntax tree as JSON.
    Json,
    /// The syntax tree in Rust debug notation.
    Tree,
    /// Nothing; only report errors.
    None,
}

/// Parse and check ADQL queries.
#[derive(Parser)]
#[command(name = "oxide-adql")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Stop at the first syntax error instead of recovering.
    /// Overrides `ADQL_RECOVER`.
    #[arg(long)]
    no_recover: bool,

    /// Stop after this many errors [env: ADQL_MAX_ERRORS, default: 64].
    #[arg(long)]
    max_errors: Option<usize>,

    /// Reject inputs with more tokens than this [env: ADQL_MAX_TOKENS].
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Abort after this many grammar rule invocations [env: ADQL_RULE_BUDGET].
    #[arg(long)]
    rule_budget: Option<usize>,

    /// Abort when the input nests deeper than this [env: ADQL_MAX_DEPTH, default: 256].
    #[arg(long)]
    max_depth: Option<usize>,

    /// Output format for parsed queries.
    #[arg(short, long, value_enum, default_value_t = Format::Sql)]
    format: Format,

    /// Print the columns each query references.
    #[arg(long)]
    columns: bool,

    /// Fold constant sub-expressions before printing.
    #[arg(long)]
    fold: bool,

    /// Query files. Reads stdin when none is given, or for `-`.
    files: Vec<PathBuf>,
}

impl Cli {
    /// Applies the flags given on the command line over `base`.
    fn config(&self, mut base: ParserConfig) -> ParserConfig {
        if self.no_recover {
            base = base.with_recovery(false);
        }
        if let Some(max_errors) = self.max_errors {
            base = base.with_max_errors(max_errors);
        }
        if self.max_tokens.is_some() {
            base = base.with_max_tokens(self.max_tokens);
        }
        if self.rule_budget.is_some() {
            base = base.with_rule_budget(self.rule_budget);
        }
        if let Some(max_depth) = self.max_depth {
            base = base.with_max_depth(max_depth);
        }
        base
    }
}

/// Outcome of a run, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Status {
    Clean = 0,
    SyntaxErrors = 1,
    Failed = 2,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        Self::from(status as u8)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install the log subscriber")?;

    let config = cli.config(ParserConfig::from_env());
    debug!(?config, "parser configuration");

    let inputs = if cli.files.is_empty() {
        vec![PathBuf::from("-")]
    } else {
        cli.files.clone()
    };

    let mut status = Status::Clean;
    for path in &inputs {
        match check(&cli, &config, path) {
            Ok(true) => {}
            Ok(false) => status = status.max(Status::SyntaxErrors),
            Err(error) => {
                eprintln!("{error}");
                status = Status::Failed;
            }
        }
    }
    Ok(status.into())
}

fn display_name(path: &Path) -> String {
    if path == Path::new("-") {
        String::from("<stdin>")
    } else {
        path.display().to_string()
    }
}

fn read_source(path: &Path, name: &str) -> Result<String, CliError> {
    let read = if path == Path::new("-") {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source).map(|_| source)
    } else {
        fs::read_to_string(path)
    };
    read.map_err(|source| CliError::Read {
        name: name.to_string(),
        source,
    })
}

/// Parses one input and prints its diagnostics and output. Returns whether
/// it parsed without syntax errors.
fn check(cli: &Cli, config: &ParserConfig, path: &Path) -> Result<bool, CliError> {
    let name = display_name(path);
    let source = read_source(path, &name)?;
    let result = try_parse_with(&source, config).map_err(|source| CliError::Lex {
        name: name.clone(),
        source,
    })?;

    for error in &result.errors {
        eprintln!("{name}:{error}");
    }
    info!(file = %name, errors = result.errors.len(), "parsed");

    let clean = result.errors.is_empty();
    let Some(mut query) = result.ast else {
        return Ok(false);
    };

    if cli.fold {
        let mut folder = ConstantFolder::default();
        query = folder.fold_query(query);
        debug!(file = %name, folded = folder.folded, "folded constants");
    }
    if cli.columns {
        for column in column_names(&query) {
            println!("{column}");
        }
    }
    if let Some(rendered) = render(&query, cli.format)? {
        println!("{rendered}");
    }
    Ok(clean)
}

fn render(query: &Query, format: Format) -> Result<Option<String>, CliError> {
    Ok(match format {
        Format::Sql => Some(query.to_string()),
        Format::Json => Some(serde_json::to_string_pretty(query)?),
        Format::Tree => Some(format!("{query:#?}")),
        Format::None => None,
    })
}

/// Distinct referenced columns, in order of first appearance.
fn column_names(query: &Query) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for column in ColumnCollector::collect(query) {
        let name = column.to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use oxide_adql_core::parse;

    fn query(sql: &str) -> Query {
        parse(sql).into_result().unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_map_to_config() {
        let cli = Cli::parse_from([
            "oxide-adql",
            "--no-recover",
            "--max-errors",
            "3",
            "--rule-budget",
            "500",
            "--max-depth",
            "32",
            "q.adql",
        ]);
        let config = cli.config(ParserConfig::default());
        assert!(!config.recover);
        assert_eq!(config.max_errors, 3);
        assert_eq!(config.max_tokens, None);
        assert_eq!(config.rule_budget, Some(500));
        assert_eq!(config.max_depth, 32);
        assert_eq!(cli.files, vec![PathBuf::from("q.adql")]);
    }

    #[test]
    fn test_absent_flags_keep_base_config() {
        let base = ParserConfig::default()
            .with_recovery(false)
            .with_max_errors(5)
            .with_max_tokens(Some(100))
            .with_max_depth(40);
        let cli = Cli::parse_from(["oxide-adql"]);
        assert_eq!(cli.config(base.clone()), base);

        let cli = Cli::parse_from(["oxide-adql", "--max-tokens", "7"]);
        let config = cli.config(base);
        assert!(!config.recover);
        assert_eq!(config.max_errors, 5);
        assert_eq!(config.max_tokens, Some(7));
        assert_eq!(config.max_depth, 40);
    }

    #[test]
    fn test_render_formats() {
        let q = query("SELECT a FROM t WHERE a > 1");
        assert_eq!(
            render(&q, Format::Sql).unwrap().as_deref(),
            Some("SELECT a FROM t WHERE a > 1")
        );
        let json = render(&q, Format::Json).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("body").is_some());
        assert!(render(&q, Format::None).unwrap().is_none());
    }

    #[test]
    fn test_column_names_are_distinct() {
        let q = query("SELECT a, b FROM t WHERE a > 1 ORDER BY b");
        assert_eq!(column_names(&q), vec!["a", "b"]);
    }

    #[test]
    fn test_status_severity() {
        assert_eq!(Status::Clean.max(Status::SyntaxErrors), Status::SyntaxErrors);
        assert_eq!(Status::Failed.max(Status::SyntaxErrors), Status::Failed);
    }
}
