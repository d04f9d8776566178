use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;

use super::resource::LocalResource;
use crate::artifact::ArtifactType;
use crate::Result;

/// Finished artifact held by the controller
#[derive(Debug, Clone)]
pub struct DownloadResult {
    resource: Arc<LocalResource>,

    /// Type of the request that produced this result
    pub artifact: ArtifactType,

    /// Extension used when saving
    pub extension: &'static str,

    /// Content type reported by the backend
    pub content_type: Option<String>,

    pub completed_at: DateTime<Utc>,
}

impl DownloadResult {
    pub fn new(artifact: ArtifactType, resource: LocalResource, content_type: Option<String>) -> Self {
        Self {
            resource: Arc::new(resource),
            artifact,
            extension: artifact.extension(),
            content_type,
            completed_at: Utc::now(),
        }
    }

    /// Location of the local resource, used as the preview source
    pub fn path(&self) -> &Path {
        self.resource.path()
    }

    pub fn size(&self) -> u64 {
        self.resource.size()
    }

    pub fn read_text(&self) -> Result<String> {
        self.resource.read_text()
    }
}

/// Everything the view layer needs to render one frame
#[derive(Debug, Clone, Default)]
pub struct LifecycleState {
    pub input: String,
    pub loading: bool,
    pub active: Option<ArtifactType>,
    pub error: Option<String>,
    pub result: Option<DownloadResult>,
}

/// Coarse phase derived from a state snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl LifecycleState {
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.error.is_some() {
            Phase::Failed
        } else if self.result.is_some() {
            Phase::Succeeded
        } else {
            Phase::Idle
        }
    }

    /// Type currently loading, for button labels
    pub fn loading_type(&self) -> Option<ArtifactType> {
        if self.loading {
            self.active
        } else {
            None
        }
    }
}
