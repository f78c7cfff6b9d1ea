use anyhow::{Context, Result};
use clap::Parser;
use kfzf_config::{init_tracing, KfzfConfig};
use kfzf_resources::ResourceKind;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "kfzf-watch",
    version,
    about = "Keep line-oriented resource dumps up to date from a JSON-lines stream of watch events"
)]
struct Cli {
    /// Path to a kfzf.toml config file (defaults to $KFZF_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Base cache directory; dumps go to <cache-dir>/<cluster>/<kind>
    #[arg(long)]
    cache_dir: Option<PathBuf>,
    /// Cluster name used as the dump subdirectory
    #[arg(long)]
    cluster: Option<String>,
    /// Minimum time between two full rewrites of a dump
    #[arg(long, value_name = "MS")]
    time_between_full_dump_ms: Option<u64>,
    /// Resource kind to keep a dump for; repeatable (defaults to the config's watch kinds)
    #[arg(long = "kind", value_name = "KIND")]
    kinds: Vec<ResourceKind>,
    /// Read events from this file instead of stdin
    #[arg(long)]
    input: Option<PathBuf>,
    /// Log level or `EnvFilter` directives
    #[arg(long)]
    log_level: Option<String>,
    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() {
    let cli = Cli::parse();
    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            2
        }
    };

    std::process::exit(exit_code);
}

fn run(cli: Cli) -> Result<i32> {
    let (mut config, loaded_from) = KfzfConfig::load(cli.config.as_deref())?;
    if let Some(cache_dir) = cli.cache_dir {
        config.store.cache_dir = Some(cache_dir);
    }
    if let Some(cluster) = cli.cluster {
        config.store.cluster = Some(cluster);
    }
    if let Some(ms) = cli.time_between_full_dump_ms {
        config.store.time_between_full_dump_ms = ms;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json_logs;

    init_tracing(&config.logging);
    if let Some(path) = &loaded_from {
        tracing::debug!(target = "kfzf.watch", path = %path.display(), "loaded config");
    }

    let kinds = if cli.kinds.is_empty() {
        config
            .watch
            .kinds
            .iter()
            .map(|kind| kind.parse::<ResourceKind>())
            .collect::<Result<Vec<_>, _>>()
            .context("invalid [watch] kinds")?
    } else {
        cli.kinds
    };

    let input: Box<dyn BufRead> = match &cli.input {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open input {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(std::io::stdin().lock()),
    };

    let store_config = config.store.store_config()?;
    let dispatcher = kfzf_cli::Dispatcher::open(&kinds, &store_config)?;
    let summary = kfzf_cli::run(input, dispatcher)?;

    for (kind, report) in &summary.workers {
        tracing::info!(
            target = "kfzf.watch",
            kind = %kind,
            events = report.events,
            write_errors = report.write_errors,
            converged = report.converged,
            "worker finished"
        );
    }
    tracing::info!(
        target = "kfzf.watch",
        lines = summary.lines,
        malformed = summary.malformed,
        unwatched = summary.unwatched,
        dropped = summary.dropped,
        "input exhausted"
    );
    Ok(0)
}
