//! ShardStore - Partitioned In-Memory Record Store
//!
//! Command-line entrypoint: executes a command file through the
//! coordinator, writing query results, per-partition metrics, and the
//! update/delete change log to their own files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shardstore::command::parser::parse_line;
use shardstore::config::ShardStoreConfig;
use shardstore::error::Result;
use shardstore::fanout::{Coordinator, Outcome};
use shardstore::sinks::{SinkSet, WriterSink};

/// ShardStore - Partitioned In-Memory Record Store
#[derive(Parser)]
#[command(name = "shardstore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "shardstore.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a command file through the coordinator
    Run {
        /// Input file, one command per line
        input: PathBuf,

        /// Query results file
        #[arg(short, long, default_value = "output.txt")]
        output: PathBuf,

        /// Per-partition live-count CSV file
        #[arg(short, long, default_value = "metrics.csv")]
        metrics: PathBuf,

        /// Update/delete change log file
        #[arg(long, default_value = "changes.log")]
        changes: PathBuf,

        /// Override the configured partition count
        #[arg(short, long)]
        partitions: Option<usize>,
    },

    /// Initialize a new configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "shardstore.toml")]
        output: PathBuf,
    },

    /// Validate configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli.log_level);

    match cli.command {
        Commands::Run {
            input,
            output,
            metrics,
            changes,
            partitions,
        } => run_file(cli.config, input, output, metrics, changes, partitions).await,
        Commands::Init { output } => run_init(output),
        Commands::Validate => run_validate(cli.config),
    }
}

/// Initialize logging
fn init_logging(level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Load the configuration, falling back to defaults if the file is absent
fn load_config(path: &PathBuf) -> Result<ShardStoreConfig> {
    if path.exists() {
        let config = ShardStoreConfig::from_file(path)?;
        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    } else {
        tracing::debug!("No configuration file at {:?}, using defaults", path);
        Ok(ShardStoreConfig::default())
    }
}

/// Execute a command file through the coordinator
async fn run_file(
    config_path: PathBuf,
    input: PathBuf,
    output: PathBuf,
    metrics: PathBuf,
    changes: PathBuf,
    partitions: Option<usize>,
) -> Result<()> {
    let mut config = load_config(&config_path)?;
    if let Some(partitions) = partitions {
        config.cluster.partitions = partitions;
        config.validate()?;
    }

    let input_file = match File::open(&input) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("Could not open input file {:?}: {}", input, e);
            return Err(e.into());
        }
    };

    let sinks = SinkSet {
        results: Box::new(WriterSink::new(File::create(&output)?)),
        metrics: Box::new(WriterSink::new(File::create(&metrics)?)),
        changes: Box::new(WriterSink::new(File::create(&changes)?)),
    };

    let mut coordinator = Coordinator::with_sinks(&config, sinks);
    tracing::info!(
        "Processing {:?} across {} partitions",
        input,
        coordinator.partitions()
    );

    let executed = process_commands(&mut coordinator, BufReader::new(input_file)).await?;
    coordinator.shutdown().await?;

    tracing::info!(
        "Done: {} commands executed; results in {:?}, metrics in {:?}, changes in {:?}",
        executed,
        output,
        metrics,
        changes
    );
    Ok(())
}

/// Feed every line of a reader through the coordinator
///
/// Lines that parse to no command are skipped; everything else runs to
/// completion, in order, one command at a time.
async fn process_commands<R: BufRead>(
    coordinator: &mut Coordinator,
    reader: R,
) -> Result<usize> {
    let mut executed = 0usize;

    for line in reader.lines() {
        let line = line?;
        let Some(command) = parse_line(&line) else {
            continue;
        };

        match coordinator.execute(command).await? {
            Outcome::Inserted { target } => {
                tracing::debug!("Inserted into partition {}", target)
            }
            Outcome::Selected { live_counts, .. } => {
                tracing::debug!("Selected; live counts {:?}", live_counts)
            }
            Outcome::Updated { count, .. } => tracing::debug!("Updated {} records", count),
            Outcome::Deleted { count, .. } => tracing::debug!("Deleted {} records", count),
        }
        executed += 1;
    }

    Ok(executed)
}

/// Write a starter configuration file
fn run_init(output: PathBuf) -> Result<()> {
    std::fs::write(&output, ShardStoreConfig::starter_toml())?;
    tracing::info!("Wrote starter configuration to {:?}", output);
    Ok(())
}

/// Validate a configuration file
fn run_validate(config_path: PathBuf) -> Result<()> {
    let config = ShardStoreConfig::from_file(&config_path)?;
    tracing::info!(
        "Configuration valid: {} partitions, capacity {} per partition",
        config.cluster.partitions,
        config.store.capacity
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn test_process_commands_end_to_end() {
        let input = "\
INSERT (alice, eng, 5)
INSERT (bob, ops, 7)
# a comment, skipped
SELECT WHERE field3=5
UPDATE SET field2=mgmt WHERE field1=alice*
DELETE WHERE field3=7
";
        let mut coordinator = Coordinator::new(&ShardStoreConfig::default());
        let executed = process_commands(&mut coordinator, Cursor::new(input))
            .await
            .unwrap();
        assert_eq!(executed, 5);

        let outcome = coordinator
            .execute(parse_line("SELECT").unwrap())
            .await
            .unwrap();
        let Outcome::Selected { text, .. } = outcome else {
            panic!("expected select outcome");
        };
        assert_eq!(text, "alice, mgmt, 5\n");

        coordinator.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_run_file_writes_all_sinks() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.sql");
        let output = dir.path().join("output.txt");
        let metrics = dir.path().join("metrics.csv");
        let changes = dir.path().join("changes.log");

        std::fs::write(
            &input,
            "INSERT (alice, eng, 5)\nSELECT WHERE field3=5\nDELETE WHERE field3=5\nSELECT WHERE field3=5\n",
        )
        .unwrap();

        run_file(
            dir.path().join("absent.toml"),
            input,
            output.clone(),
            metrics.clone(),
            changes.clone(),
            Some(3),
        )
        .await
        .unwrap();

        let results = std::fs::read_to_string(&output).unwrap();
        assert_eq!(
            results,
            "alice, eng, 5\nno records found. Query attributes: field3=5\n"
        );

        let metrics = std::fs::read_to_string(&metrics).unwrap();
        assert_eq!(metrics, "0,0,1\n0,0,0\n");

        let changes = std::fs::read_to_string(&changes).unwrap();
        assert_eq!(changes, "[worker 3] deleted: alice, eng, 5\n");
    }

    #[tokio::test]
    async fn test_init_then_validate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shardstore.toml");
        run_init(path.clone()).unwrap();
        run_validate(path).unwrap();
    }
}
