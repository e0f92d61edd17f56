use crate::cleanup::{self, SharedCleanupContext};
use crate::runtime::Runtime;
use anyhow::{Context, Result, anyhow};
use flate2::read::GzDecoder;
use log::{debug, info};
use std::path::{Component, Path, PathBuf};
use tar::{Archive, EntryType};

use super::ArchiveExtractor;

/// Extractor for .tar.gz archives
///
/// Entries are installed one path level up, so the contents of the wrapping
/// directory release archives use land directly in the destination.
pub struct TarGzExtractor;

impl ArchiveExtractor for TarGzExtractor {
    #[tracing::instrument(skip(self, runtime, cleanup_ctx))]
    fn extract_with_cleanup<R: Runtime + 'static>(
        &self,
        runtime: &R,
        archive_path: &Path,
        extract_to: &Path,
        cleanup_ctx: SharedCleanupContext,
    ) -> Result<()> {
        debug!("Extracting tar.gz archive to {:?}...", extract_to);
        let file = runtime
            .open(archive_path)
            .with_context(|| format!("Failed to open archive at {:?}", archive_path))?;
        let mut archive = Archive::new(GzDecoder::new(file));

        let dir_name = extract_to
            .file_name()
            .ok_or_else(|| anyhow!("Invalid extraction directory: {:?}", extract_to))?;
        let temp_extract_dir =
            extract_to.with_file_name(format!("{}_temp_extract", dir_name.to_string_lossy()));
        if runtime.exists(&temp_extract_dir) {
            runtime.remove_dir_all(&temp_extract_dir)?;
        }
        runtime.create_dir_all(&temp_extract_dir)?;

        // Register temp_extract_dir for cleanup on interruption
        cleanup::lock(&cleanup_ctx).add(temp_extract_dir.clone());

        let result = self
            .unpack_entries(runtime, &mut archive, &temp_extract_dir)
            .and_then(|()| self.lift_contents(runtime, &temp_extract_dir, extract_to));

        // Clean up the temporary extraction directory either way
        if runtime.exists(&temp_extract_dir) {
            runtime.remove_dir_all(&temp_extract_dir)?;
        }
        cleanup::lock(&cleanup_ctx).remove(&temp_extract_dir);

        result?;
        info!("Extraction complete.");
        Ok(())
    }
}

impl TarGzExtractor {
    fn unpack_entries<R: Runtime, T: std::io::Read>(
        &self,
        runtime: &R,
        archive: &mut Archive<T>,
        temp_extract_dir: &Path,
    ) -> Result<()> {
        debug!("Unpacking to temp dir: {:?}", temp_extract_dir);

        let entries = archive
            .entries()
            .context("Failed to read tar.gz archive")?;
        for entry in entries {
            let mut entry = entry.context("Failed to read tar entry")?;
            let entry_path = entry
                .path()
                .context("Failed to read tar entry path")?
                .into_owned();

            let Some(relative) = enclosed_name(&entry_path) else {
                debug!("Skipping entry with unsafe path {:?}", entry_path);
                continue;
            };
            let full_path = temp_extract_dir.join(&relative);

            match entry.header().entry_type() {
                EntryType::Directory => runtime.create_dir_all(&full_path)?,
                EntryType::Regular | EntryType::Continuous => {
                    if let Some(parent) = full_path.parent() {
                        runtime.create_dir_all(parent)?;
                    }
                    let mut dest_file = runtime.create_file(&full_path)?;
                    std::io::copy(&mut entry, &mut dest_file)
                        .with_context(|| format!("Failed to extract file {:?}", full_path))?;
                    drop(dest_file);

                    // Set file permissions from archive metadata (Unix only)
                    #[cfg(unix)]
                    if let Ok(mode) = entry.header().mode()
                        && let Err(e) = runtime.set_permissions(&full_path, mode)
                    {
                        debug!("Failed to set permissions on {:?}: {}", full_path, e);
                    }
                }
                other => {
                    debug!("Skipping {:?} entry {:?}", other, entry_path);
                }
            }
        }
        Ok(())
    }

    /// Moves extracted files into `extract_to` with the first path level
    /// stripped: each top-level directory contributes its contents. Files at
    /// the top level are kept as they are.
    fn lift_contents<R: Runtime>(
        &self,
        runtime: &R,
        temp_extract_dir: &Path,
        extract_to: &Path,
    ) -> Result<()> {
        let entries = runtime
            .read_dir(temp_extract_dir)
            .context("Failed to read temp extraction directory")?;
        if entries.is_empty() {
            return Err(anyhow!("Archive appears to be empty."));
        }

        runtime.create_dir_all(extract_to)?;
        for entry in entries {
            if runtime.is_dir(&entry) {
                debug!("Moving contents from {:?} to {:?}", entry, extract_to);
                for item in runtime.read_dir(&entry)? {
                    move_into(runtime, &item, extract_to)?;
                }
            } else {
                move_into(runtime, &entry, extract_to)?;
            }
        }
        Ok(())
    }
}

fn move_into<R: Runtime>(runtime: &R, item: &Path, dir: &Path) -> Result<()> {
    let Some(file_name) = item.file_name() else {
        return Ok(());
    };
    let dest_path = dir.join(file_name);
    debug!("Installing {:?}", dest_path);
    runtime.rename(item, &dest_path)
}

/// Returns `path` if it stays inside the extraction directory.
fn enclosed_name(path: &Path) -> Option<PathBuf> {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => result.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if result.as_os_str().is_empty() {
        None
    } else {
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::RealRuntime;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::fs::{self, File};
    use tar::Builder;
    use tempfile::tempdir;

    fn create_test_archive(path: &Path, files: &[(&str, &str, u32)]) -> Result<()> {
        let file = File::create(path)?;
        let enc = GzEncoder::new(file, Compression::default());
        let mut tar = Builder::new(enc);

        for (name, content, mode) in files {
            let mut header = tar::Header::new_gnu();
            header.set_path(name)?;
            header.set_size(content.len() as u64);
            header.set_mode(*mode);
            header.set_cksum();
            tar.append(&header, content.as_bytes())?;
        }

        tar.into_inner()?.finish()?;
        Ok(())
    }

    fn extract(archive_path: &Path, extract_to: &Path) -> Result<()> {
        TarGzExtractor.extract_with_cleanup(
            &RealRuntime,
            archive_path,
            extract_to,
            cleanup::new_shared(),
        )
    }

    #[test]
    fn test_extract_strips_single_toplevel_dir() -> Result<()> {
        let dir = tempdir()?;
        let archive_path = dir.path().join("rlx.tar.gz");
        let extract_path = dir.path().join("bin");

        create_test_archive(
            &archive_path,
            &[
                ("rlx-v1.0.0-x86_64-unknown-linux-musl/rlx", "#!/bin/sh\n", 0o755),
                ("rlx-v1.0.0-x86_64-unknown-linux-musl/README.md", "docs", 0o644),
            ],
        )?;

        extract(&archive_path, &extract_path)?;

        assert_eq!(fs::read_to_string(extract_path.join("rlx"))?, "#!/bin/sh\n");
        assert!(extract_path.join("README.md").exists());
        assert!(!dir.path().join("bin_temp_extract").exists());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(extract_path.join("rlx"))?.permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }

        Ok(())
    }

    #[test]
    fn test_extract_flat_archive() -> Result<()> {
        let dir = tempdir()?;
        let archive_path = dir.path().join("rlx.tar.gz");
        let extract_path = dir.path().join("bin");

        create_test_archive(
            &archive_path,
            &[("rlx.exe", "MZ", 0o644), ("LICENSE", "MIT", 0o644)],
        )?;

        extract(&archive_path, &extract_path)?;

        assert_eq!(fs::read_to_string(extract_path.join("rlx.exe"))?, "MZ");
        assert_eq!(fs::read_to_string(extract_path.join("LICENSE"))?, "MIT");
        Ok(())
    }

    #[test]
    fn test_extract_strips_wrapper_next_to_top_level_files() -> Result<()> {
        let dir = tempdir()?;
        let archive_path = dir.path().join("rlx.tar.gz");
        let extract_path = dir.path().join("bin");

        create_test_archive(
            &archive_path,
            &[("pkg/rlx", "bin", 0o755), ("README", "docs", 0o644)],
        )?;

        extract(&archive_path, &extract_path)?;

        assert_eq!(fs::read_to_string(extract_path.join("rlx"))?, "bin");
        assert_eq!(fs::read_to_string(extract_path.join("README"))?, "docs");
        assert!(!extract_path.join("pkg").exists());
        Ok(())
    }

    #[test]
    fn test_extract_merges_several_top_level_dirs() -> Result<()> {
        let dir = tempdir()?;
        let archive_path = dir.path().join("rlx.tar.gz");
        let extract_path = dir.path().join("bin");

        create_test_archive(
            &archive_path,
            &[("bin/rlx", "bin", 0o755), ("doc/rlx.1", "man", 0o644)],
        )?;

        extract(&archive_path, &extract_path)?;

        assert!(extract_path.join("rlx").is_file());
        assert!(extract_path.join("rlx.1").is_file());
        Ok(())
    }

    #[test]
    fn test_extract_with_cleanup_unregisters_temp_dir() -> Result<()> {
        let dir = tempdir()?;
        let archive_path = dir.path().join("rlx.tar.gz");
        let extract_path = dir.path().join("bin");
        create_test_archive(&archive_path, &[("pkg/rlx", "bin", 0o755)])?;

        let ctx = cleanup::new_shared();
        TarGzExtractor.extract_with_cleanup(
            &RealRuntime,
            &archive_path,
            &extract_path,
            ctx.clone(),
        )?;

        assert!(ctx.lock().unwrap().paths.is_empty());
        assert!(extract_path.join("rlx").exists());
        Ok(())
    }

    #[test]
    fn test_extract_corrupt_archive_fails_and_cleans_temp_dir() -> Result<()> {
        let dir = tempdir()?;
        let archive_path = dir.path().join("rlx.tar.gz");
        let extract_path = dir.path().join("bin");
        fs::write(&archive_path, "this is not gzip")?;

        let result = extract(&archive_path, &extract_path);

        assert!(result.is_err());
        assert!(!dir.path().join("bin_temp_extract").exists());
        Ok(())
    }

    #[test]
    fn test_extract_empty_archive() -> Result<()> {
        let dir = tempdir()?;
        let archive_path = dir.path().join("rlx.tar.gz");
        let extract_path = dir.path().join("bin");
        create_test_archive(&archive_path, &[])?;

        let err = extract(&archive_path, &extract_path).unwrap_err();
        assert!(err.to_string().contains("empty"));
        Ok(())
    }

    #[test]
    fn test_enclosed_name() {
        assert_eq!(
            enclosed_name(Path::new("./pkg/rlx")),
            Some(PathBuf::from("pkg/rlx"))
        );
        assert_eq!(enclosed_name(Path::new("../etc/passwd")), None);
        assert_eq!(enclosed_name(Path::new("/etc/passwd")), None);
        assert_eq!(enclosed_name(Path::new(".")), None);
    }
}
