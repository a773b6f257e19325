//! Picture-in-picture node CLI.
//!
//! Usage:
//!   pip-node list                 List media in the input directory
//!   pip-node load <NAME>          Resolve a media name to a path
//!   pip-node resolve [OPTIONS]    Print resolved overlay parameters
//!   pip-node overlay [OPTIONS]    Compose an overlay
//!   pip-node check                Check FFmpeg availability

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pip_media::{check_ffmpeg, check_ffprobe};
use pip_node::{NodeConfig, OverlayInputs, PipNode};

#[derive(Parser)]
#[command(
    name = "pip-node",
    about = "Picture-in-picture overlay composition",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List media files in the input directory
    List,

    /// Resolve a media name (optionally annotated, e.g. "clip.mp4 [output]")
    Load {
        name: String,
    },

    /// Probe both inputs and print the resolved parameters as JSON
    Resolve(OverlayArgs),

    /// Compose the overlay and print the output path
    Overlay(OverlayArgs),

    /// Check that ffmpeg and ffprobe are installed
    Check,
}

#[derive(Args)]
struct OverlayArgs {
    /// Main (background) media
    main_media: String,

    /// Overlay media
    overlay_media: String,

    /// left-top, left-bottom, right-top, right-bottom or "x,y"
    #[arg(short, long, default_value = "left-top")]
    position: String,

    /// Overlay width (0 with height 0 = auto)
    #[arg(long, default_value = "0")]
    width: i64,

    /// Overlay height (0 with width 0 = auto)
    #[arg(long, default_value = "0")]
    height: i64,

    /// Overlay start (seconds)
    #[arg(long, default_value = "0")]
    start: f64,

    /// Overlay end (seconds, 0 = derive)
    #[arg(long, default_value = "0")]
    end: f64,

    /// main, overlay, mix or none
    #[arg(short, long, default_value = "main")]
    audio: String,
}

impl From<OverlayArgs> for OverlayInputs {
    fn from(args: OverlayArgs) -> Self {
        Self {
            main_media: args.main_media,
            overlay_media: args.overlay_media,
            overlay_position: args.position,
            overlaysize_width: args.width,
            overlaysize_height: args.height,
            start: args.start,
            end: args.end,
            audio_option: args.audio,
        }
    }
}

fn init_tracing() -> anyhow::Result<()> {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("pip=info".parse().context("invalid log directive")?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();
    let config = NodeConfig::from_env();
    info!("Node config: {:?}", config);

    // Ctrl-C kills the running FFmpeg invocation; the pipeline then cleans up
    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            cancel_tx.send(true).ok();
        }
    });

    let node = PipNode::cancellable(config, cancel_rx);

    match cli.command {
        Commands::List => {
            for name in node.list_media().await? {
                println!("{}", name);
            }
        }
        Commands::Load { name } => {
            let path = node.load_media(&name)?;
            println!("{}", path.display());
        }
        Commands::Resolve(args) => {
            let resolution = node.resolve(&args.into()).await?;
            println!("{}", serde_json::to_string_pretty(&resolution)?);
        }
        Commands::Overlay(args) => match node.overlay_media(&args.into()).await {
            Some(path) => println!("{}", path.display()),
            None => {
                error!("Overlay produced no output");
                std::process::exit(1);
            }
        },
        Commands::Check => {
            let ffmpeg = check_ffmpeg();
            let ffprobe = check_ffprobe();
            for (tool, found) in [("ffmpeg", &ffmpeg), ("ffprobe", &ffprobe)] {
                match found {
                    Ok(path) => println!("{:<8} {}", tool, path.display()),
                    Err(_) => println!("{:<8} missing", tool),
                }
            }
            if ffmpeg.is_err() || ffprobe.is_err() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
