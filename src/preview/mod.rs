use anyhow::Result;
use console::style;
use std::fmt::Write;
use std::path::PathBuf;

use crate::artifact::{ArtifactType, PreviewLayout, PreviewModality};
use crate::controller::LifecycleState;
use crate::utils::format_file_size;

/// What the view should show for a finished artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub artifact: ArtifactType,
    pub modality: PreviewModality,
    pub layout: PreviewLayout,

    /// Display source
    pub source: PathBuf,
}

/// Pick the preview for a snapshot; nothing to show without a result
pub fn render_preview(state: &LifecycleState) -> Option<Preview> {
    let result = state.result.as_ref()?;
    let artifact = state.active.unwrap_or(result.artifact);
    let info = artifact.info();

    Some(Preview {
        artifact,
        modality: info.modality,
        layout: info.layout,
        source: result.path().to_path_buf(),
    })
}

/// Terminal rendering of a preview. Text previews are shown inline.
pub fn format_preview(state: &LifecycleState) -> Result<Option<String>> {
    let (Some(preview), Some(result)) = (render_preview(state), state.result.as_ref()) else {
        return Ok(None);
    };

    let size = format_file_size(result.size());
    let content = match preview.modality {
        PreviewModality::Video => format!(
            "▶ Video preview [{}x{}] {} ({})",
            preview.layout.width,
            preview.layout.height.unwrap_or(0),
            preview.source.display(),
            size
        ),
        PreviewModality::Audio => format!(
            "♪ Audio preview [{}] {} ({})",
            preview.layout.width,
            preview.source.display(),
            size
        ),
        PreviewModality::Text => {
            let text = result.read_text()?;
            format!("── Subtitles Preview ({}) ──\n{}", size, text.trim_end())
        }
    };

    Ok(Some(content))
}

/// Summary line for the current result: type, size, content type, arrival time
pub fn format_result_details(state: &LifecycleState) -> Option<String> {
    let result = state.result.as_ref()?;

    Some(format!(
        "{} · {} · {} · received {}",
        result.artifact.label(),
        format_file_size(result.size()),
        result.content_type.as_deref().unwrap_or("unknown type"),
        result.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ))
}

/// One frame of the interactive view: buttons, error, loading, and preview
pub fn format_frame(state: &LifecycleState) -> Result<String> {
    let mut frame = String::new();
    let loading = state.loading_type();

    let buttons: Vec<String> = ArtifactType::ALL
        .iter()
        .map(|artifact| format!("[{}]", artifact.request_label(loading)))
        .collect();
    writeln!(frame, "{}", buttons.join(" "))?;

    if let Some(error) = &state.error {
        writeln!(frame, "{}", style(error).red())?;
    }

    if state.loading {
        writeln!(frame, "{}", style("Loading...").dim())?;
    }

    if let Some(preview) = format_preview(state)? {
        writeln!(frame, "{}", preview)?;
    }

    if state.result.is_some() {
        let label = state
            .active
            .map(|artifact| artifact.save_label())
            .unwrap_or_else(|| "Download File".to_string());
        writeln!(frame, "[{}] (:save)", label)?;
    }

    Ok(frame)
}
