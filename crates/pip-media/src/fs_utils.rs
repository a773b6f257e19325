//! Filesystem helpers for output handling.
//!
//! Final artifacts are produced in a scratch directory and moved onto their
//! canonical path only once complete. The scratch directory may live on a
//! different filesystem, so moves fall back to copy-and-delete on EXDEV.

use std::path::Path;
use std::time::UNIX_EPOCH;
use tokio::fs;

use pip_models::InputStamp;

use crate::error::{MediaError, MediaResult};

/// Move a file from `src` to `dst`, replacing `dst` and handling
/// cross-device moves.
///
/// A fast rename is tried first. On EXDEV the file is copied next to `dst`
/// and renamed into place, so `dst` is never observed half-written.
pub async fn move_file(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if let Some(parent) = dst.parent() {
        ensure_dir(parent).await?;
    }

    match fs::rename(src, dst).await {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device_error(&e) => {
            tracing::debug!(
                "Cross-device rename detected, falling back to copy+delete: {} -> {}",
                src.display(),
                dst.display()
            );
            copy_and_delete(src, dst).await
        }
        Err(e) => Err(MediaError::from(e)),
    }
}

/// Check if an IO error is EXDEV (cross-device link).
fn is_cross_device_error(e: &std::io::Error) -> bool {
    // EXDEV is error code 18 on Linux/macOS
    e.raw_os_error() == Some(18)
}

async fn copy_and_delete(src: &Path, dst: &Path) -> MediaResult<()> {
    // Same directory as dst, so the final rename stays on one filesystem
    let tmp_dst = dst.with_extension("partial");

    if let Err(e) = fs::copy(src, &tmp_dst).await {
        let _ = fs::remove_file(&tmp_dst).await;
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&tmp_dst, dst).await {
        let _ = fs::remove_file(&tmp_dst).await;
        return Err(e.into());
    }

    if let Err(e) = fs::remove_file(src).await {
        tracing::warn!(
            "Failed to remove source file after cross-device move: {}: {}",
            src.display(),
            e
        );
    }

    Ok(())
}

/// Create a directory and its parents if missing.
pub async fn ensure_dir(dir: &Path) -> MediaResult<()> {
    if !dir.as_os_str().is_empty() && !dir.exists() {
        fs::create_dir_all(dir).await?;
    }
    Ok(())
}

/// Size and modification time of a file, for fingerprinting.
pub async fn input_stamp(path: &Path) -> MediaResult<InputStamp> {
    let metadata = fs::metadata(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => MediaError::FileNotFound(path.to_path_buf()),
        _ => MediaError::from(e),
    })?;

    let modified = metadata
        .modified()
        .ok()
        .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
        .unwrap_or_default();

    Ok(InputStamp {
        len: metadata.len(),
        modified_secs: modified.as_secs(),
        modified_nanos: modified.subsec_nanos(),
    })
}
