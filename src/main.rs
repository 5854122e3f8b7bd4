use anyhow::{Context, Result};
use aws_infra_mcp::aws::AwsSessionFactory;
use aws_infra_mcp::config::Config;
use aws_infra_mcp::mcp::{serve_stdio, McpServer};
use aws_infra_mcp::tools::{ToolDefaults, ToolRegistry};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// MCP server exposing read-only AWS infrastructure tools (EC2, S3, RDS)
#[derive(Parser, Debug)]
#[command(name = "aws-infra-mcp", version = aws_infra_mcp::VERSION, about, long_about = None)]
struct Args {
    /// Default AWS profile for calls that do not pass one
    #[arg(short, long)]
    profile: Option<String>,

    /// Default AWS region for calls that do not pass one
    #[arg(short, long)]
    region: Option<String>,

    /// Log level (logs to platform config dir: Linux ~/.config/aws-infra-mcp/aws-infra-mcp.log, macOS ~/Library/Application Support/aws-infra-mcp/aws-infra-mcp.log, Windows %APPDATA%/aws-infra-mcp/aws-infra-mcp.log)
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    /// Custom AWS endpoint URL (for LocalStack, etc.). Also reads from AWS_ENDPOINT_URL env var.
    #[arg(long)]
    endpoint_url: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// stdout carries the protocol, so logs always go to a file.
fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("aws-infra-mcp {} started with log level: {:?}", aws_infra_mcp::VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("aws-infra-mcp").join("aws-infra-mcp.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".aws-infra-mcp").join("aws-infra-mcp.log");
    }
    PathBuf::from("aws-infra-mcp.log")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Keep the guard alive for the duration of the program
    let _log_guard = setup_logging(args.log_level)?;

    // CLI args > saved config; anything unset is left to the SDK chain
    let endpoint_url = args
        .endpoint_url
        .clone()
        .or_else(|| std::env::var("AWS_ENDPOINT_URL").ok());
    let config = Config::load().with_overrides(args.profile.clone(), args.region.clone(), endpoint_url);
    tracing::info!(
        "Defaults: profile: {:?}, region: {:?}, endpoint_url: {:?}",
        config.profile,
        config.region,
        config.endpoint_url
    );

    let factory = AwsSessionFactory::new().with_endpoint_url(config.endpoint_url.clone());
    let registry = ToolRegistry::new(Arc::new(factory)).with_defaults(ToolDefaults {
        region: config.region,
        profile: config.profile,
    });
    let server = Arc::new(McpServer::new(Arc::new(registry)));

    serve_stdio(server).await.context("MCP stdio transport failed")?;
    Ok(())
}
