use anyhow::Context;
use std::io::Write;
use std::path::Path;
use tempfile::{Builder, NamedTempFile, TempDir};

use crate::artifact::ArtifactType;
use crate::Result;

/// Directory owning every materialized artifact of one controller.
///
/// Dropping the store removes the directory and anything still in it.
#[derive(Debug)]
pub struct ResourceStore {
    workspace: TempDir,
}

impl ResourceStore {
    pub fn new() -> Result<Self> {
        let workspace = Builder::new()
            .prefix("reelgrab-")
            .tempdir()
            .context("Failed to create resource workspace")?;

        tracing::debug!("Resource workspace: {}", workspace.path().display());
        Ok(Self { workspace })
    }

    /// Store under an explicit parent directory instead of the system temp dir
    pub fn new_in(parent: &Path) -> Result<Self> {
        fs_err::create_dir_all(parent)?;
        let workspace = Builder::new()
            .prefix("reelgrab-")
            .tempdir_in(parent)
            .context("Failed to create resource workspace")?;

        Ok(Self { workspace })
    }

    pub fn path(&self) -> &Path {
        self.workspace.path()
    }

    /// Open a fresh, empty resource in the workspace
    pub fn create(&self, artifact: ArtifactType) -> Result<ResourceWriter> {
        let file = Builder::new()
            .prefix(&format!("{}-", artifact.slug()))
            .suffix(artifact.extension())
            .tempfile_in(self.workspace.path())
            .context("Failed to create local resource")?;

        Ok(ResourceWriter { file, len: 0 })
    }

    #[cfg(test)]
    pub(crate) fn materialize(&self, artifact: ArtifactType, bytes: &[u8]) -> Result<LocalResource> {
        let mut writer = self.create(artifact)?;
        writer.write_chunk(bytes)?;
        writer.finish()
    }

    /// Remove the workspace, reporting any failure
    pub fn close(self) -> Result<()> {
        self.workspace
            .close()
            .context("Failed to remove resource workspace")
    }
}

/// Resource being filled chunk by chunk.
///
/// Dropping an unfinished writer deletes the partial file.
#[derive(Debug)]
pub struct ResourceWriter {
    file: NamedTempFile,
    len: u64,
}

impl ResourceWriter {
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.file
            .write_all(chunk)
            .context("Failed to write local resource")?;
        self.len += chunk.len() as u64;
        Ok(())
    }

    pub fn finish(mut self) -> Result<LocalResource> {
        self.file.flush().context("Failed to flush local resource")?;

        Ok(LocalResource {
            file: self.file,
            len: self.len,
        })
    }
}

/// Locally materialized artifact, usable as a preview source and a save source.
///
/// The backing file is deleted when the resource is dropped.
#[derive(Debug)]
pub struct LocalResource {
    file: NamedTempFile,
    len: u64,
}

impl LocalResource {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size(&self) -> u64 {
        self.len
    }

    /// Contents decoded as UTF-8, replacing invalid sequences
    pub fn read_text(&self) -> Result<String> {
        let bytes = fs_err::read(self.path())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Drop for LocalResource {
    fn drop(&mut self) {
        tracing::trace!("Releasing local resource {}", self.file.path().display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_materialize_writes_bytes() {
        let store = ResourceStore::new().unwrap();
        let resource = store.materialize(ArtifactType::Subtitles, b"hello reel").unwrap();

        assert_eq!(resource.size(), 10);
        assert!(resource.path().starts_with(store.path()));
        assert_eq!(resource.path().extension().unwrap(), "txt");
        assert_eq!(resource.read_text().unwrap(), "hello reel");
    }

    #[test]
    fn test_drop_releases_file() {
        let store = ResourceStore::new().unwrap();
        let resource = store.materialize(ArtifactType::Video, &[0u8; 16]).unwrap();
        let path = resource.path().to_path_buf();

        assert!(path.exists());
        drop(resource);
        assert!(!path.exists());
    }

    #[test]
    fn test_writer_appends_chunks() {
        let store = ResourceStore::new().unwrap();
        let mut writer = store.create(ArtifactType::Subtitles).unwrap();
        writer.write_chunk(b"first line\n").unwrap();
        writer.write_chunk(b"second line").unwrap();
        let resource = writer.finish().unwrap();

        assert_eq!(resource.size(), 22);
        assert_eq!(resource.read_text().unwrap(), "first line\nsecond line");
    }

    #[test]
    fn test_unfinished_writer_leaves_nothing() {
        let store = ResourceStore::new().unwrap();
        let mut writer = store.create(ArtifactType::Video).unwrap();
        writer.write_chunk(&[1u8; 64]).unwrap();
        drop(writer);

        assert_eq!(fs_err::read_dir(store.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_close_removes_workspace() {
        let parent = tempfile::tempdir().unwrap();
        let store = ResourceStore::new_in(parent.path()).unwrap();
        let workspace = store.path().to_path_buf();
        let _leaked = store.materialize(ArtifactType::Audio, b"id3").unwrap();

        store.close().unwrap();
        assert!(!workspace.exists());
    }
}
