use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roster::config::Config;
use roster::roster::{BufferSink, CategoryColumn, RosterLoader, StdoutSink};
use roster::server::ReportServer;

#[derive(Parser)]
#[command(
    name = "roster",
    version,
    about = "Student roster reporter with a plain-text HTTP report server",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file (environment variables are used otherwise)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the roster report over HTTP
    Serve {
        /// Roster file to report on
        database: Option<PathBuf>,

        /// Interface to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to bind
        #[arg(short, long)]
        port: Option<u16>,

        /// Category column ("last" or a zero-based field index)
        #[arg(long)]
        category_column: Option<CategoryColumn>,

        /// Answer load failures with 503 instead of 200
        #[arg(long)]
        strict_status: bool,
    },

    /// Print the roster summary once and exit
    Count {
        /// Roster file to report on
        database: PathBuf,

        /// Category column ("last" or a zero-based field index)
        #[arg(long)]
        category_column: Option<CategoryColumn>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }

    setup_tracing(&config.logging.format, &config.logging.level, cli.verbose)?;

    match cli.command {
        Commands::Serve {
            database,
            host,
            port,
            category_column,
            strict_status,
        } => {
            if let Some(database) = database {
                config.database.path = Some(database);
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(column) = category_column {
                config.database.category_column = column;
            }
            config.server.strict_status |= strict_status;
            config.validate()?;

            tracing::info!(
                database = ?config.database.path,
                port = %config.server.port,
                category_column = %config.database.category_column,
                "Starting serve command"
            );
            serve(config).await?;
        }

        Commands::Count {
            database,
            category_column,
            format,
        } => {
            if let Some(column) = category_column {
                config.database.category_column = column;
            }
            config.validate()?;

            tracing::debug!(
                database = %database.display(),
                category_column = %config.database.category_column,
                format = ?format,
                "Starting count command"
            );
            count(config, database, format).await?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("roster=debug,tower_http=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("roster={level},warn")))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize tracing")?;
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize tracing")?;
        }
    }

    Ok(())
}

async fn serve(config: Config) -> Result<()> {
    let server_config = config.server_config()?;
    let server = ReportServer::new(server_config)?;

    println!("{}", server.info().display());
    println!();

    match server.preflight().await {
        Ok(report) => tracing::info!(
            total = report.total(),
            categories = report.len(),
            skipped = report.skipped(),
            "Roster database is readable"
        ),
        Err(e) => tracing::warn!(
            error = %e,
            "Roster database is not readable yet; /students will report the failure"
        ),
    }

    server.start_with_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn count(config: Config, database: PathBuf, format: OutputFormat) -> Result<()> {
    let loader = RosterLoader::new(config.load_options());

    let report = tokio::task::spawn_blocking(move || match format {
        OutputFormat::Text => loader.load_blocking(&database, &mut StdoutSink),
        OutputFormat::Json => loader.load_blocking(&database, &mut BufferSink::new()),
    })
    .await
    .context("Roster load task panicked")??;

    if format == OutputFormat::Json {
        println!("{}", report.to_json()?);
    }

    if report.skipped() > 0 {
        tracing::warn!(skipped = report.skipped(), "Some roster lines were malformed");
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
