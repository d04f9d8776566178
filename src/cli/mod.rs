use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::artifact::ArtifactType;
use crate::config::BACKEND_URL_ENV;

#[derive(Parser)]
#[command(
    name = "reelgrab",
    about = "reelgrab - Download video, audio, or subtitles for social-media reels",
    version,
    long_about = "Paste the URL of a reel and choose what to get: the video as MP4, the audio as MP3, or the transcribed text as TXT. Artifacts are produced by a download backend and can be previewed before saving."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Download backend base URL
    #[arg(long, global = true, env = BACKEND_URL_ENV, value_name = "URL")]
    pub backend_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch one artifact for a reel URL, preview it, and save it
    Download {
        /// What to fetch
        #[arg(value_enum, value_name = "TYPE")]
        kind: ArtifactType,

        /// Reel URL
        #[arg(value_name = "URL")]
        url: String,

        /// Directory to save into (defaults to the configured save directory)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Only preview, do not save
        #[arg(long)]
        no_save: bool,

        /// Skip the preview
        #[arg(long)]
        no_preview: bool,
    },

    /// Interactive session: paste URLs, request artifacts, save results
    Session {
        /// Directory to save into (defaults to the configured save directory)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Show or create the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List the artifact types the backend serves
    Types,
}
