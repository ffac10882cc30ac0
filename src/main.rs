use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use watchtime::api::state::AppState;
use watchtime::config::AppConfig;
use watchtime::duration::format_seconds;
use watchtime::fetch::YouTubeClient;
use watchtime::models::PlaybackSpeed;
use watchtime::pipeline::Analyzer;
use watchtime::render::{render_report, RenderOptions};

#[derive(Parser)]
#[command(name = "watchtime")]
#[command(about = "Total watch time of a YouTube playlist at any playback speed")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./watchtime.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error). Defaults to the config value.
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// YouTube Data API key (overrides YOUTUBE_API_KEY and the config file)
    #[arg(long)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a playlist and print its total duration
    Analyze {
        /// Playlist URL (anything containing `list=<id>`)
        url: String,

        /// Playback speed for the adjusted total (e.g. "1.5", "1.5x")
        #[arg(long, default_value = "1")]
        speed: PlaybackSpeed,

        /// Print the adjusted total for every speed
        #[arg(long)]
        all_speeds: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Only print the summary, not every video
        #[arg(long)]
        summary: bool,
    },

    /// List the selectable playback speeds
    Speeds,

    /// Start the API server
    Serve {
        /// Bind address (defaults to the config value)
        #[arg(long)]
        host: Option<String>,

        /// Port number (defaults to the config value)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn build_analyzer(config: &AppConfig) -> Result<Analyzer> {
    let client = YouTubeClient::new(config.client_config())
        .context("Failed to build YouTube client")?;
    Ok(Analyzer::new(Arc::new(client)))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    if let Some(key) = cli.api_key.clone() {
        config.youtube.api_key = Some(key);
    }

    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    init_tracing(&level, cli.json_logs);

    tracing::info!("Starting watchtime v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Analyze {
            url,
            speed,
            all_speeds,
            json,
            summary,
        } => {
            let analyzer = build_analyzer(&config)?;
            let report = match analyzer.analyze(&url).await {
                Ok(report) => report,
                Err(e) => {
                    tracing::error!("{}", e);
                    bail!("{}", e.user_message());
                }
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let options = RenderOptions {
                    speed,
                    all_speeds,
                    utc_offset_hours: config.display_utc_offset_hours,
                    show_items: !summary,
                };
                print!("{}", render_report(&report, &options));
            }
        }
        Commands::Speeds => {
            for speed in PlaybackSpeed::ALL {
                println!(
                    "{:>6}  (1 hour takes {})",
                    speed.to_string(),
                    format_seconds(3600.0 / speed.multiplier())
                );
            }
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            if config.youtube.api_key.is_none() {
                tracing::warn!("No YouTube API key configured; analyses will fail until one is set");
            }

            let state = AppState::new(build_analyzer(&config)?);
            let app = watchtime::api::build_router_with_cors(state, &config.server.cors_origin);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("API listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
