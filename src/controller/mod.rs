use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

pub mod resource;
pub mod state;

pub use resource::{LocalResource, ResourceStore};
pub use state::{DownloadResult, LifecycleState, Phase};

use crate::artifact::ArtifactType;
use crate::service::ArtifactService;
use crate::ReelError;

/// Which completion wins when submissions overlap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseOrdering {
    /// Every completion is applied; the one that resolves last wins
    #[default]
    LastResolved,
    /// Completions of anything but the newest submission are dropped
    LastInitiated,
}

#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub ordering: ResponseOrdering,

    /// Directory that `trigger_save` writes into
    pub save_dir: PathBuf,

    /// Parent for the resource workspace (system temp dir if unset)
    pub workspace_parent: Option<PathBuf>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            ordering: ResponseOrdering::default(),
            save_dir: PathBuf::from("."),
            workspace_parent: None,
        }
    }
}

/// Drives one artifact request at a time against the backend and publishes
/// every state transition to subscribers.
pub struct LifecycleController {
    service: Box<dyn ArtifactService>,
    state: watch::Sender<LifecycleState>,
    store: ResourceStore,
    sequence: AtomicU64,
    ordering: ResponseOrdering,
    save_dir: PathBuf,
}

impl LifecycleController {
    pub fn new(service: Box<dyn ArtifactService>, options: ControllerOptions) -> crate::Result<Self> {
        let store = match &options.workspace_parent {
            Some(parent) => ResourceStore::new_in(parent)?,
            None => ResourceStore::new()?,
        };

        tracing::debug!(
            "Controller using backend {} ({:?})",
            service.name(),
            options.ordering
        );

        let (state, _rx) = watch::channel(LifecycleState::default());

        Ok(Self {
            service,
            state,
            store,
            sequence: AtomicU64::new(0),
            ordering: options.ordering,
            save_dir: options.save_dir,
        })
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> LifecycleState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state transition
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    pub fn set_input(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.send_modify(|state| state.input = text);
    }

    /// Request an artifact for the current input.
    ///
    /// Empty input fails with [`ReelError::Validation`] without touching the
    /// network. Any other failure is reported as [`ReelError::Request`]. The
    /// loading flag and input are reset on every path that reached the network.
    pub async fn submit(&self, artifact: ArtifactType) -> Result<DownloadResult, ReelError> {
        let input = self.state.borrow().input.clone();

        if input.trim().is_empty() {
            self.state
                .send_modify(|state| state.error = Some(ReelError::Validation.to_string()));
            return Err(ReelError::Validation);
        }

        // Tokens are taken under the state lock, same as the completion check
        let mut token = 0;
        self.state.send_modify(|state| {
            token = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
            state.error = None;
            state.result = None;
            state.loading = true;
            state.active = Some(artifact);
        });

        tracing::info!("Requesting {} for {} (request #{})", artifact, input, token);

        let outcome = self.fetch_result(artifact, &input).await;

        let mut superseded = false;
        self.state.send_if_modified(|state| {
            if self.ordering == ResponseOrdering::LastInitiated
                && token != self.sequence.load(Ordering::SeqCst)
            {
                superseded = true;
                return false;
            }

            match &outcome {
                Ok(result) => {
                    state.result = Some(result.clone());
                    state.active = Some(artifact);
                }
                Err(_) => state.error = Some(ReelError::Request.to_string()),
            }
            state.loading = false;
            state.input.clear();
            true
        });

        if superseded {
            tracing::debug!("Dropping stale {} response (request #{})", artifact, token);
            return Err(ReelError::Superseded);
        }

        if let Ok(result) = &outcome {
            tracing::info!("Received {} ({} bytes)", artifact, result.size());
        }

        outcome
    }

    async fn fetch_result(&self, artifact: ArtifactType, url: &str) -> Result<DownloadResult, ReelError> {
        self.download(artifact, url).await.map_err(|e| {
            tracing::warn!("Error downloading {}: {:#}", artifact, e);
            ReelError::Request
        })
    }

    /// Stream the backend body into a fresh local resource
    async fn download(&self, artifact: ArtifactType, url: &str) -> crate::Result<DownloadResult> {
        let payload = self.service.fetch(artifact, url).await?;
        let mut writer = self.store.create(artifact)?;
        let mut chunks = payload.chunks;

        while let Some(chunk) = chunks.next().await {
            writer.write_chunk(&chunk?)?;
        }

        Ok(DownloadResult::new(artifact, writer.finish()?, payload.content_type))
    }

    /// Save the current result into the save directory as `<type><extension>`.
    ///
    /// Does nothing without a result. Disk failures are logged, not surfaced.
    pub fn trigger_save(&self) -> Option<PathBuf> {
        let snapshot = self.snapshot();
        let result = snapshot.result.as_ref()?;
        let artifact = snapshot.active.unwrap_or(result.artifact);

        let target = self.save_dir.join(artifact.file_name());

        let copied = fs_err::create_dir_all(&self.save_dir).and_then(|_| fs_err::copy(result.path(), &target));
        match copied {
            Ok(bytes) => {
                tracing::info!("Saved {} bytes to {}", bytes, target.display());
                Some(target)
            }
            Err(e) => {
                tracing::warn!("Failed to save {}: {}", target.display(), e);
                None
            }
        }
    }

    /// Drop the current result and remove the resource workspace
    pub fn close(self) -> crate::Result<()> {
        self.state.send_modify(|state| state.result = None);
        self.store.close()
    }
}
