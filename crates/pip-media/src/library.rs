//! Input media library helpers.

use std::path::Path;
use tokio::fs;

use crate::error::MediaResult;

/// Extensions offered for upload, compared case-insensitively.
pub const VIDEO_EXTENSIONS: &[&str] = &["webm", "mp4", "mkv", "gif", "mov"];

/// Strip surrounding whitespace, then at most one leading and one trailing
/// double quote.
///
/// This is not general unquoting: `' ""test"'` becomes `"test`.
pub fn strip_path(path: &str) -> &str {
    let path = path.trim();
    let path = path.strip_prefix('"').unwrap_or(path);
    path.strip_suffix('"').unwrap_or(path)
}

/// Whether a filename carries one of [`VIDEO_EXTENSIONS`] after its last dot.
pub fn is_media_filename(name: &str) -> bool {
    match name.rsplit_once('.') {
        Some((_, ext)) => VIDEO_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// Sorted names of the media files directly inside `dir`.
pub async fn list_media_files(dir: impl AsRef<Path>) -> MediaResult<Vec<String>> {
    let mut entries = fs::read_dir(dir.as_ref()).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if is_media_filename(&name) {
            files.push(name);
        }
    }

    files.sort();
    Ok(files)
}
