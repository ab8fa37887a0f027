use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_player::{
    Player, PlayerConfig, group_channels, parse_channels, select_backend,
};

#[derive(Parser)]
#[command(name = "m3u-player")]
#[command(version)]
#[command(about = "IPTV playlist ingestion with adaptive streaming backend selection")]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a playlist file and print the channel list
    Parse {
        file: PathBuf,

        /// Emit the parsed channels as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Print which backend would be selected for a URL
    Classify { url: String },

    /// Attach a playback backend to a URL and report the outcome
    Play { url: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("m3u_player={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &cli.config {
        Some(path) => PlayerConfig::load_from_file(path)?,
        None => PlayerConfig::load()?,
    };

    match cli.command {
        Command::Parse { file, json } => {
            let content = tokio::fs::read_to_string(&file).await?;
            let channels = parse_channels(&content);
            info!(
                file = %file.display(),
                channels = channels.len(),
                "playlist parsed"
            );

            if json {
                println!("{}", serde_json::to_string_pretty(&channels)?);
            } else {
                for group in group_channels(&channels) {
                    println!("{} ({})", group.name, group.channels.len());
                    for channel in &group.channels {
                        println!("  {}  {}", channel.name, channel.url);
                    }
                }
            }
        }

        Command::Classify { url } => {
            println!("{}", select_backend(&url, true));
        }

        Command::Play { url } => {
            let player = Player::new(config);
            match player.play_url(&url).await {
                Ok(status) => {
                    println!(
                        "attached backend '{}' for {}",
                        status.backend,
                        status.media_url.as_deref().unwrap_or(&url)
                    );
                    player.release_playback().await;
                }
                Err(e) => {
                    error!(url = %url, error = %e, "playback failed");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
