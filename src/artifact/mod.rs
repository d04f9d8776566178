use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

/// Kind of artifact the backend can derive from a reel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ArtifactType {
    /// The reel video, saved as MP4
    Video,
    /// The reel audio track, saved as MP3
    Audio,
    /// Transcribed text, saved as TXT
    Subtitles,
}

/// How a finished artifact is shown before saving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewModality {
    /// Playable video element
    Video,
    /// Playable audio element
    Audio,
    /// Embedded text view
    Text,
}

/// Fixed layout for a preview widget, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewLayout {
    pub width: u32,
    pub height: Option<u32>,
}

/// Per-variant lookup entry
#[derive(Debug, Clone, Copy)]
pub struct ArtifactInfo {
    pub slug: &'static str,
    pub extension: &'static str,
    pub label: &'static str,
    pub modality: PreviewModality,
    pub layout: PreviewLayout,
    pub description: &'static str,
}

const VIDEO: ArtifactInfo = ArtifactInfo {
    slug: "video",
    extension: ".mp4",
    label: "Video",
    modality: PreviewModality::Video,
    layout: PreviewLayout { width: 300, height: Some(450) },
    description: "Download the reel video in MP4 format",
};

const AUDIO: ArtifactInfo = ArtifactInfo {
    slug: "audio",
    extension: ".mp3",
    label: "Audio",
    modality: PreviewModality::Audio,
    layout: PreviewLayout { width: 300, height: None },
    description: "Extract and download the audio from the reel in MP3 format",
};

const SUBTITLES: ArtifactInfo = ArtifactInfo {
    slug: "subtitles",
    extension: ".txt",
    label: "Subtitles",
    modality: PreviewModality::Text,
    layout: PreviewLayout { width: 800, height: None },
    description: "Get the transcribed text of the reel in TXT format",
};

/// Label shown on a request button while its request is in flight
pub const WAIT_LABEL: &str = "Please wait...";

impl ArtifactType {
    pub const ALL: [ArtifactType; 3] = [ArtifactType::Video, ArtifactType::Audio, ArtifactType::Subtitles];

    pub fn info(&self) -> &'static ArtifactInfo {
        match self {
            ArtifactType::Video => &VIDEO,
            ArtifactType::Audio => &AUDIO,
            ArtifactType::Subtitles => &SUBTITLES,
        }
    }

    /// Endpoint path segment and saved file stem
    pub fn slug(&self) -> &'static str {
        self.info().slug
    }

    /// File extension including the leading dot
    pub fn extension(&self) -> &'static str {
        self.info().extension
    }

    pub fn label(&self) -> &'static str {
        self.info().label
    }

    pub fn modality(&self) -> PreviewModality {
        self.info().modality
    }

    /// Name used when saving, e.g. `video.mp4`
    pub fn file_name(&self) -> String {
        format!("{}{}", self.slug(), self.extension())
    }

    /// Label of the request button. Only the type currently loading shows the wait text.
    pub fn request_label(&self, loading: Option<ArtifactType>) -> String {
        if loading == Some(*self) {
            WAIT_LABEL.to_string()
        } else {
            format!("Download {}", self.label())
        }
    }

    /// Label of the save action for a finished artifact
    pub fn save_label(&self) -> String {
        format!("Download {}", self.label())
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for ArtifactType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" => Ok(ArtifactType::Video),
            "audio" => Ok(ArtifactType::Audio),
            "subtitles" => Ok(ArtifactType::Subtitles),
            other => anyhow::bail!("Unknown artifact type: {}", other),
        }
    }
}
