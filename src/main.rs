use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelgrab::artifact::{ArtifactType, WAIT_LABEL};
use reelgrab::cli::{Cli, Commands};
use reelgrab::controller::{LifecycleController, LifecycleState};
use reelgrab::preview::{format_frame, format_preview, format_result_details};
use reelgrab::service::HttpArtifactService;
use reelgrab::utils::{self, SessionCommand};
use reelgrab::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "reelgrab=debug" } else { "reelgrab=info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Download {
            kind,
            url,
            output_dir,
            no_save,
            no_preview,
        } => {
            let config = Config::load()
                .await?
                .with_backend_override(cli.backend_url.as_deref())?
                .with_save_dir(output_dir);

            run_download(&config, kind, url, no_save, no_preview, cli.quiet).await?;
        }
        Commands::Session { output_dir } => {
            let config = Config::load()
                .await?
                .with_backend_override(cli.backend_url.as_deref())?
                .with_save_dir(output_dir);

            run_session(&config).await?;
        }
        Commands::Config { show } => {
            let config = Config::load()
                .await?
                .with_backend_override(cli.backend_url.as_deref())?;
            if show {
                config.display();
            } else {
                let path = config.save().await?;
                println!("Configuration written to: {}", path.display());
            }
        }
        Commands::Types => {
            println!("Available downloads:");
            for artifact in ArtifactType::ALL {
                println!(
                    "  • {:<10} {:<5} {}",
                    artifact.label(),
                    artifact.extension(),
                    artifact.info().description
                );
            }
            println!();
            println!("Usage: reelgrab download <video|audio|subtitles> <REEL_URL>");
        }
    }

    Ok(())
}

fn build_controller(config: &Config) -> Result<LifecycleController> {
    let service = HttpArtifactService::new(&config.backend.base_url, config.timeout())?;
    LifecycleController::new(Box::new(service), config.controller_options())
}

async fn run_download(
    config: &Config,
    kind: ArtifactType,
    url: String,
    no_save: bool,
    no_preview: bool,
    quiet: bool,
) -> Result<()> {
    let controller = build_controller(config)?;

    if let Some(domain) = utils::extract_domain(&url) {
        tracing::info!("Fetching {} from {}", kind.label().to_lowercase(), domain);
    }
    controller.set_input(url);

    let progress = if quiet {
        None
    } else {
        let progress = ProgressBar::new_spinner();
        progress.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
        progress.set_message(WAIT_LABEL);
        progress.enable_steady_tick(Duration::from_millis(100));
        Some(progress)
    };

    let outcome = controller.submit(kind).await;

    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    outcome?;

    let state = controller.snapshot();
    if let Some(details) = format_result_details(&state) {
        tracing::info!("{}", details);
    }
    if !no_preview {
        if let Some(preview) = format_preview(&state)? {
            println!("{}", preview);
        }
    }

    if !no_save {
        match controller.trigger_save() {
            Some(path) => println!("{} saved to: {}", kind.label(), path.display()),
            None => anyhow::bail!("Failed to save {}", kind.file_name()),
        }
    }

    drop(state);
    controller.close()
}

async fn run_session(config: &Config) -> Result<()> {
    let controller = Arc::new(build_controller(config)?);
    let renderer = tokio::spawn(render_updates(controller.subscribe()));

    println!("Paste the URL of the reel you want to download or transcribe.");
    print_session_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match utils::parse_session_line(&line) {
            SessionCommand::Input(text) => controller.set_input(text),
            SessionCommand::Submit(kind) => {
                let controller = Arc::clone(&controller);
                tokio::spawn(async move {
                    // Outcome is rendered from the state
                    let _ = controller.submit(kind).await;
                });
            }
            SessionCommand::Save => match controller.trigger_save() {
                Some(path) => println!("Saved to: {}", path.display()),
                None => println!("Nothing to save yet"),
            },
            SessionCommand::State => {
                let state = controller.snapshot();
                println!("Input: {}", state.input);
                if let Some(details) = format_result_details(&state) {
                    println!("Result: {}", details);
                }
                print!("{}", format_frame(&state)?);
            }
            SessionCommand::Help => print_session_help(),
            SessionCommand::Quit => break,
        }
    }

    renderer.abort();
    match Arc::try_unwrap(controller) {
        Ok(controller) => controller.close()?,
        Err(_) => tracing::debug!("Requests still in flight, leaving workspace cleanup to drop"),
    }

    Ok(())
}

/// Print a frame whenever loading, error, or result changes
async fn render_updates(mut updates: tokio::sync::watch::Receiver<LifecycleState>) {
    let mut last: Option<(bool, Option<String>, Option<PathBuf>)> = None;

    while updates.changed().await.is_ok() {
        let state = updates.borrow_and_update().clone();
        let key = (
            state.loading,
            state.error.clone(),
            state.result.as_ref().map(|r| r.path().to_path_buf()),
        );
        if last.as_ref() == Some(&key) {
            continue;
        }
        last = Some(key);

        match format_frame(&state) {
            Ok(frame) => print!("{}", frame),
            Err(e) => tracing::warn!("Failed to render state: {:#}", e),
        }
    }
}

fn print_session_help() {
    println!("  <url>        set the reel URL");
    println!("  :video       download video (.mp4)");
    println!("  :audio       download audio (.mp3)");
    println!("  :subtitles   download subtitles (.txt)");
    println!("  :save        save the current result");
    println!("  :state       show the current state");
    println!("  :quit        exit");
}
