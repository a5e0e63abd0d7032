use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

/// Audio inpainting and voice-cloning worker
#[derive(Debug, Parser)]
#[command(name = "revoice", about = "Serverless worker for audio inpainting and voice-cloning TTS")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "revoice.toml", env = "REVOICE_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "REVOICE_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Process a single event file, print its outcome and exit
    #[arg(long, value_name = "FILE")]
    pub event: Option<PathBuf>,
}
