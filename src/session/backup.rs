//! Backup and restore — gzip-compressed tar archives of the whole store.
//!
//! A backup captures the base directory exactly as it sits on disk:
//! `index.json`, every file under `sessions/`, nothing else. Restore is
//! verify-then-replace; see [`super::manager::SessionManager::restore_sessions`]
//! for the non-transactional caveat.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::path::Path;

/// Archive `base_dir` into a gzip tarball at `dest`. Parent directories of
/// `dest` are created as needed.
pub fn create_archive(base_dir: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating backup directory {}", parent.display()))?;
        }
    }

    let file =
        File::create(dest).with_context(|| format!("creating archive {}", dest.display()))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    builder
        .append_dir_all(".", base_dir)
        .with_context(|| format!("archiving {}", base_dir.display()))?;

    let encoder = builder.into_inner().context("finalizing archive")?;
    encoder.finish().context("flushing archive")?;
    Ok(())
}

/// Unpack the gzip tarball at `archive_path` into `dest`.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path)
        .with_context(|| format!("opening archive {}", archive_path.display()))?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    archive
        .unpack(dest)
        .with_context(|| format!("extracting archive to {}", dest.display()))?;
    Ok(())
}

/// Replace `base_dir` with the contents of `src`.
///
/// Destructive and non-transactional: the old tree is removed before the
/// copy begins, so an interruption in between leaves `base_dir` partial or
/// missing.
pub fn replace_dir(src: &Path, base_dir: &Path) -> Result<()> {
    if base_dir.exists() {
        fs::remove_dir_all(base_dir)
            .with_context(|| format!("removing {}", base_dir.display()))?;
    }
    copy_tree(src, base_dir)
}

fn copy_tree(src: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).with_context(|| format!("creating {}", dest.display()))?;
    let entries =
        fs::read_dir(src).with_context(|| format!("reading directory {}", src.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("reading entry in {}", src.display()))?;
        let target = dest.join(entry.file_name());
        let file_type = entry
            .file_type()
            .with_context(|| format!("inspecting {}", entry.path().display()))?;
        if file_type.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("copying {}", entry.path().display()))?;
        }
    }
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seed_store(dir: &Path) {
        fs::create_dir_all(dir.join("sessions")).unwrap();
        fs::write(dir.join("index.json"), r#"{"folders":[],"sessions":{}}"#).unwrap();
        fs::write(dir.join("sessions/a.json"), r#"{"id":"a","title":"t"}"#).unwrap();
    }

    #[test]
    fn archive_roundtrip_preserves_tree() {
        let store = TempDir::new().unwrap();
        seed_store(store.path());

        let out = TempDir::new().unwrap();
        let archive = out.path().join("backups/store.tar.gz");
        create_archive(store.path(), &archive).unwrap();
        assert!(archive.exists());

        let extracted = TempDir::new().unwrap();
        extract_archive(&archive, extracted.path()).unwrap();

        assert!(extracted.path().join("index.json").exists());
        let body = fs::read_to_string(extracted.path().join("sessions/a.json")).unwrap();
        assert_eq!(body, r#"{"id":"a","title":"t"}"#);
    }

    #[test]
    fn replace_dir_swaps_contents() {
        let old = TempDir::new().unwrap();
        let base = old.path().join("store");
        seed_store(&base);
        fs::write(base.join("sessions/stale.json"), "{}").unwrap();

        let incoming = TempDir::new().unwrap();
        seed_store(incoming.path());

        replace_dir(incoming.path(), &base).unwrap();

        assert!(base.join("sessions/a.json").exists());
        assert!(!base.join("sessions/stale.json").exists());
    }

    #[test]
    fn extract_missing_archive_errors() {
        let dest = TempDir::new().unwrap();
        assert!(extract_archive(Path::new("/nonexistent/b.tar.gz"), dest.path()).is_err());
    }
}
