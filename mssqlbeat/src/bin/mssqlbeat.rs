use std::{
    env,
    path::{Path, PathBuf},
};

use clap::{Args, Parser, Subcommand};
use jemallocator::Jemalloc;
use mssqlbeat::{
    beat::{self, Beat},
    config::{self, Config},
    signals,
    sink::{self, prometheus},
};
use tokio::{runtime::Builder, signal};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[derive(thiserror::Error, Debug)]
enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] config::Error),
    #[error("Beat returned an error: {0}")]
    Beat(#[from] beat::Error),
    #[error("Failed to install prometheus exporter: {0}")]
    Prometheus(#[from] metrics_exporter_prometheus::BuildError),
}

fn default_config_path() -> PathBuf {
    PathBuf::from("/etc/mssqlbeat/mssqlbeat.yaml")
}

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll SQL Server performance counters until interrupted
    Run(ConfigArgs),
    /// Validate configuration file and exit
    ConfigCheck(ConfigArgs),
}

#[derive(Args)]
struct ConfigArgs {
    /// path on disk to the configuration file
    #[clap(long, default_value_os_t = default_config_path())]
    config_path: PathBuf,
}

/// Load configuration, preferring the contents of `MSSQLBEAT_CONFIG` over the
/// file at `config_path`.
fn load_config(config_path: &Path) -> Result<Config, Error> {
    let config = if let Ok(contents) = env::var("MSSQLBEAT_CONFIG") {
        debug!("Using config from env var 'MSSQLBEAT_CONFIG'");
        Config::from_yaml(&contents)
    } else {
        debug!(
            "Attempting to open configuration file at: {}",
            config_path.display()
        );
        config::load_config_from_path(config_path)
    };
    config.map_err(|err| {
        error!("Configuration validation failed: {err}");
        Error::Config(err)
    })
}

async fn inner_main(config: Config) -> Result<(), Error> {
    // The prometheus sink records gauges into the global recorder; serve
    // them. Host telemetry lands there too. With any other sink host
    // telemetry goes to the no-op recorder.
    if let sink::Config::Prometheus(ref conf) = config.sink {
        prometheus::builder(conf, config.period()).install()?;
        info!("Prometheus exporter listening on {}", conf.addr);
    }

    let (watcher, broadcaster) = signals::signal();
    let beat = Beat::new(config, watcher)?;
    let beat_handle = tokio::spawn(beat.run());

    tokio::spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => info!("received ctrl-c"),
            Err(err) => warn!("unable to listen for ctrl-c, shutting down: {err}"),
        }
        broadcaster.signal();
    });

    match beat_handle.await {
        Ok(res) => res?,
        Err(err) => error!("beat task failed to join: {err}"),
    }
    Ok(())
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .finish()
        .init();

    let version = env!("CARGO_PKG_VERSION");

    let cli = Cli::parse();
    let args = match cli.command {
        Commands::Run(args) => args,
        Commands::ConfigCheck(args) => match load_config(&args.config_path) {
            Ok(_) => {
                info!("Configuration file is valid");
                std::process::exit(0)
            }
            Err(_) => std::process::exit(1),
        },
    };

    info!("Starting mssqlbeat {version} run.");
    let config = load_config(&args.config_path)?;

    let runtime = Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .build()?;
    let res = runtime.block_on(inner_main(config));
    info!("Bye. :)");
    res
}
