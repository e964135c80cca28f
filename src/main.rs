use anistream::modules::provider::{CanonicalAnimeId, Subtype};
use anistream::shared::utils::init_logger;
use anistream::{EngineConfig, StreamingService, VideoRequest};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "anistream", version, about = "Resolve anime episodes and video sources")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List episodes per provider for an AniList id
    Episodes {
        id: String,
        /// Cache with the short TTL used for currently airing shows
        #[arg(long)]
        airing: bool,
        /// Drop the cached listing before resolving
        #[arg(long)]
        refresh: bool,
    },
    /// Resolve playable sources for one episode
    Video {
        id: String,
        provider: String,
        episode_id: String,
        episode_number: u32,
        #[arg(long)]
        dub: bool,
        #[arg(long)]
        refresh: bool,
    },
}

fn print_json<T: Serialize>(value: &Option<T>) -> Result<()> {
    match value {
        Some(value) => println!("{}", serde_json::to_string_pretty(value)?),
        None => println!("null"),
    }
    Ok(())
}

async fn run(command: Command, service: &StreamingService) -> Result<()> {
    match command {
        Command::Episodes {
            id,
            airing,
            refresh,
        } => {
            let id = CanonicalAnimeId::parse(&id)?;
            let episodes = service.resolve_episodes(&id, airing, refresh).await?;
            print_json(&episodes)
        }
        Command::Video {
            id,
            provider,
            episode_id,
            episode_number,
            dub,
            refresh,
        } => {
            let subtype = if dub { Subtype::Dub } else { Subtype::Sub };
            let request =
                VideoRequest::parse(&id, &provider, &episode_id, episode_number, subtype.as_str())?;
            let video = service.resolve_video(&request, refresh).await?;
            print_json(&video)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logger();

    let cli = Cli::parse();
    let config = EngineConfig::from_env().context("Invalid configuration")?;
    let service = StreamingService::from_config(&config)
        .await
        .context("Failed to initialise the streaming service")?;

    let shutdown = CancellationToken::new();
    let ctrl_c_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!("Interrupted, abandoning in-flight requests");
            ctrl_c_token.cancel();
        }
    });

    tokio::select! {
        result = run(cli.command, &service) => result,
        _ = shutdown.cancelled() => {
            anyhow::bail!("Cancelled")
        }
    }
}
