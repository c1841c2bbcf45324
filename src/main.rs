//! ccbook - Entry Point

use ccbook::config::ResolvedConfig;
use ccbook::pipeline::{convert, convert_batch, BatchItem};
use ccbook::render::highlighter::theme_names;
use ccbook::render::RenderOptions;
use ccbook::resolver::ProjectIndex;
use ccbook::source::{discover_sessions, encode_project_path, LogSource, SessionFilter};
use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// ccbook - turn Claude Code session logs into HTML transcripts
#[derive(Parser, Debug)]
#[command(name = "ccbook")]
#[command(version)]
#[command(about = "Convert Claude Code JSONL session logs into self-contained HTML transcripts")]
pub struct Args {
    /// Log debug details (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Color theme for syntax highlighting
    #[arg(long, global = true, value_parser = PossibleValuesParser::new(theme_names()))]
    pub theme: Option<String>,

    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Convert the given log files
    Convert {
        /// JSONL session logs
        #[arg(required = true)]
        logs: Vec<PathBuf>,

        /// Destination directory for the HTML artifacts
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Directory searched for sub-agent logs (default: each log's directory)
        #[arg(long)]
        project_dir: Option<PathBuf>,
    },

    /// Convert every session recorded for a working directory
    Sync {
        /// Only convert this session
        session_id: Option<String>,

        /// Project log directory (default: derived from --cwd)
        #[arg(long)]
        project_dir: Option<PathBuf>,

        /// Working directory whose sessions are converted (default: current directory)
        #[arg(long)]
        cwd: Option<PathBuf>,

        /// Destination directory for the HTML artifacts
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

impl Command {
    fn out(&self) -> Option<PathBuf> {
        match self {
            Command::Convert { out, .. } | Command::Sync { out, .. } => out.clone(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = ccbook::config::load_config_with_precedence(args.config.clone())?;
        let merged = ccbook::config::merge_config(config_file);
        let with_env = ccbook::config::apply_env_overrides(merged);
        ccbook::config::apply_cli_overrides(with_env, args.theme.clone(), args.command.out())
    };

    ccbook::logging::init(config.log_file_path.as_deref(), args.verbose)?;
    info!(config = ?config, "Configuration loaded and resolved");

    let items = match args.command {
        Command::Convert {
            logs, project_dir, ..
        } => run_convert(&logs, project_dir.as_deref(), &config),
        Command::Sync {
            session_id,
            project_dir,
            cwd,
            ..
        } => run_sync(session_id, project_dir, cwd, &config)?,
    };

    let failed = report(&items);
    if failed > 0 {
        return Err(format!("{} of {} sessions failed", failed, items.len()).into());
    }
    Ok(())
}

/// Convert explicit log files, each resolving sub-agents next to itself
/// unless a project directory is given.
fn run_convert(logs: &[PathBuf], project_dir: Option<&Path>, config: &ResolvedConfig) -> Vec<BatchItem> {
    let options = config.render_options();
    logs.iter()
        .map(|path| BatchItem {
            source: path.clone(),
            result: convert_one(path, project_dir, &config.output_dir, &options),
        })
        .collect()
}

fn convert_one(
    path: &Path,
    project_dir: Option<&Path>,
    destination: &Path,
    options: &RenderOptions,
) -> Result<ccbook::pipeline::ConversionReport, ccbook::model::ConvertError> {
    let source = LogSource::from_path(path).map_err(ccbook::model::ReconstructError::from)?;
    let index_dir = match project_dir {
        Some(dir) => dir.to_path_buf(),
        None => log_directory(path),
    };
    convert(&source, &ProjectIndex::new(index_dir), destination, options)
}

fn log_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Convert every session of one project directory.
fn run_sync(
    session_id: Option<String>,
    project_dir: Option<PathBuf>,
    cwd: Option<PathBuf>,
    config: &ResolvedConfig,
) -> Result<Vec<BatchItem>, Box<dyn std::error::Error>> {
    let project_dir = match project_dir {
        Some(dir) => dir,
        None => {
            let cwd = match cwd {
                Some(dir) => std::path::absolute(dir)?,
                None => std::env::current_dir()?,
            };
            config.projects_dir.join(encode_project_path(&cwd))
        }
    };

    let filter = SessionFilter {
        session_id,
        ..SessionFilter::default()
    };
    let sources = discover_sessions(&project_dir, &filter)?;
    if sources.is_empty() {
        warn!(project = %project_dir.display(), "No sessions found");
    }

    let index = ProjectIndex::new(&project_dir);
    Ok(convert_batch(
        &sources,
        &index,
        &config.output_dir,
        &config.render_options(),
    ))
}

/// Print artifact paths, log failures, and count them.
fn report(items: &[BatchItem]) -> usize {
    let mut failed = 0;
    for item in items {
        match &item.result {
            Ok(report) => println!("{}", report.artifacts.primary.display()),
            Err(e) => {
                failed += 1;
                error!(source = %item.source.display(), error = %e, "Conversion failed");
                eprintln!("{}: {}", item.source.display(), e);
            }
        }
    }
    failed
}
