use crate::error::Error;
use crate::provider::ProviderMovie;
use crate::quality::Quality;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// File name for a saved torrent, e.g. `Inception (2010) [1080p].torrent`.
///
/// Characters that are not allowed in file names on common platforms become `_`.
pub fn torrent_file_name(movie: &ProviderMovie, quality: Quality) -> String {
    let stem: String = format!("{} [{}]", movie.display_title(), quality)
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let stem = stem.trim().trim_end_matches('.');
    format!("{}.torrent", stem)
}

/// Write the torrent blob into `dir`, creating the directory if needed.
pub async fn save_torrent_file(
    bytes: &[u8],
    dir: &Path,
    file_name: &str,
) -> crate::Result<PathBuf> {
    fs::create_dir_all(dir).await.map_err(|source| Error::Io {
        operation: "create directory",
        path: dir.display().to_string(),
        source,
    })?;

    let path = dir.join(file_name);
    fs::write(&path, bytes).await.map_err(|source| Error::Io {
        operation: "write",
        path: path.display().to_string(),
        source,
    })?;

    info!("Saved {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}
