//! reelgrab - fetch video, audio, or subtitles for social-media reels
//!
//! This library drives requests against a download backend that derives artifacts
//! from a reel URL, keeps the result as a local resource for previewing, and saves
//! it to disk on demand.

pub mod artifact;
pub mod cli;
pub mod config;
pub mod controller;
pub mod preview;
pub mod service;
pub mod utils;

pub use artifact::ArtifactType;
pub use cli::{Cli, Commands};
pub use config::Config;
pub use controller::{ControllerOptions, DownloadResult, LifecycleController, LifecycleState, ResponseOrdering};
pub use preview::{render_preview, Preview};
pub use service::{ArtifactPayload, ArtifactService, HttpArtifactService};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Errors surfaced by a submission
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReelError {
    #[error("Please enter a link.")]
    Validation,

    #[error("Link not valid or server error.")]
    Request,

    /// A newer submission was started before this one completed
    #[error("Response superseded by a newer request")]
    Superseded,
}
