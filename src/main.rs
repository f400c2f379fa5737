use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use dmsoft::decode::{self, DecodeError, items};
use dmsoft::{FindResult, ProcessStage, StageConfig};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid log filter: {0}")]
    LogFilter(String),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Dmsoft(#[from] dmsoft::Error),
}

/// Result string layouts understood by `decode`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum DecodeKind {
    /// `x,y`
    Point,
    /// `a|b|c`
    Strings,
    /// `1,2,3`
    Ints,
    /// `label,score,x,y,w,h|...`
    Detections,
    /// `name|path|cpu|memory`
    Process,
}

#[derive(Parser)]
#[command(name = "dmsoft")]
#[command(about = "Inspect dm.dmsoft result strings and stage its native modules")]
struct Cli {
    /// Log filter, e.g. `info` or `dmsoft=debug`
    #[arg(long, global = true, env = "DMSOFT_LOG", default_value = "warn")]
    log: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a composite result string
    Decode {
        /// Layout of the input
        #[arg(value_enum)]
        kind: DecodeKind,

        /// Result string as returned by the automation object
        input: String,
    },

    /// Copy the bundled modules out and register the automation module
    Stage {
        /// Stage configuration (TOML)
        #[arg(short, long, env = "DMSOFT_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn init_logging(filter: &str) -> Result<(), AppError> {
    let filter = EnvFilter::try_new(filter).map_err(|e| AppError::LogFilter(e.to_string()))?;
    let layer = fmt::layer()
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);
    tracing_subscriber::registry().with(filter).with(layer).init();
    Ok(())
}

fn write_find_result(out: &mut impl Write, result: &FindResult) -> io::Result<()> {
    if !result.found {
        return writeln!(out, "(none)");
    }
    for item in &result.items {
        let label = item.name.as_deref().unwrap_or("-");
        let score = item.probability.unwrap_or_default();
        match item.rect {
            Some(rect) => writeln!(
                out,
                "{}\t{}\t{},{}\t{}x{}",
                label,
                score,
                rect.x1,
                rect.y1,
                rect.size().width,
                rect.size().height
            )?,
            None => writeln!(out, "{}\t{}", label, score)?,
        }
    }
    Ok(())
}

fn run_decode(kind: DecodeKind, input: &str) -> Result<(), AppError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match kind {
        DecodeKind::Point => match decode::parse_point(input)? {
            Some(point) => writeln!(out, "{}", point)?,
            None => writeln!(out, "(none)")?,
        },
        DecodeKind::Strings => {
            for item in decode::parse_string_list(input) {
                writeln!(out, "{}", item)?;
            }
        }
        DecodeKind::Ints => {
            for value in decode::parse_int_list(input)? {
                writeln!(out, "{}", value)?;
            }
        }
        DecodeKind::Detections => {
            let result = decode::parse_find_result(input, items::yolo_detection)?;
            write_find_result(&mut out, &result)?;
        }
        DecodeKind::Process => {
            let info = decode::parse_process_info(input)?;
            writeln!(out, "name:   {}", info.name)?;
            writeln!(out, "path:   {}", info.path)?;
            writeln!(out, "cpu:    {}%", info.cpu)?;
            writeln!(out, "memory: {} bytes", info.memory)?;
        }
    }
    Ok(())
}

fn run_stage(config: Option<PathBuf>) -> Result<(), AppError> {
    let config = match config {
        Some(path) => StageConfig::from_file(&path).map_err(dmsoft::Error::from)?,
        None => StageConfig::default(),
    };
    tracing::info!(bundle = %config.bundle_dir.display(), "staging native modules");

    let stage = ProcessStage::new(config);
    let staged = stage.ensure()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "staged into {}", staged.dir().display())?;
    for (name, path) in staged.modules() {
        writeln!(out, "  {}\t{}", name, path.display())?;
    }
    Ok(())
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    init_logging(&cli.log)?;

    match cli.command {
        Commands::Decode { kind, input } => run_decode(kind, &input),
        Commands::Stage { config } => run_stage(config),
    }
}
