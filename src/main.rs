mod backend;
mod config;
mod replay;
mod script;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use clap::Parser;

use crate::backend::MemoryBackend;
use crate::config::{ConfigError, ReplayConfig};
use crate::replay::Session;
use crate::script::ScriptError;

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("cannot open script {path}: {source}")]
    OpenScript { path: PathBuf, source: io::Error },
}

#[derive(Parser, Debug)]
#[command(name = "eqmark", about = "Replay annotation overlay sessions and print the emitted intents")]
struct Cli {
    /// JSON-lines event script; stdin when absent.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Persist intents to an in-memory record store and feed snapshots back.
    #[arg(long)]
    auto_persist: bool,

    /// Paper id for records saved with --auto-persist.
    #[arg(long, env = "EQMARK_PAPER_ID")]
    paper_id: Option<String>,
}

fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let mut config = ReplayConfig::from_env()?;
    if let Some(paper_id) = cli.paper_id {
        config.paper_id = paper_id;
    }

    let backend = cli.auto_persist.then(|| MemoryBackend::new(config.paper_id.clone()));
    let mut session = Session::new(config.engine, backend);
    let stdout = io::stdout().lock();

    match cli.script {
        Some(path) => {
            let file = File::open(&path).map_err(|source| AppError::OpenScript { path: path.clone(), source })?;
            session.run(BufReader::new(file), stdout)?;
        }
        None => session.run(io::stdin().lock(), stdout)?,
    }
    let records = session.backend.as_ref().map_or(0, |b| b.records().len());
    tracing::info!(boxes = session.core.doc.len(), records, "replay finished");
    Ok(())
}
