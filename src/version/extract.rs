//! Archive extraction for downloaded release assets

use std::io::{Cursor, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::debug;

use crate::version::error::DownloadError;

/// Archive formats published for coolify-cli
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    Zip,
}

impl ArchiveKind {
    /// Picks the format from an asset extension (`tar.gz`, `tgz`, `zip`)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "tar.gz" | "tgz" => Some(Self::TarGz),
            "zip" => Some(Self::Zip),
            _ => None,
        }
    }
}

/// Extracts an archive held in memory into `dest`.
///
/// Any previous content of `dest` is removed first, so a staging directory
/// left over from a failed attempt never leaks into the next one.
pub fn extract_archive(data: &[u8], kind: ArchiveKind, dest: &Path) -> Result<(), DownloadError> {
    if dest.exists() {
        std::fs::remove_dir_all(dest)?;
    }
    std::fs::create_dir_all(dest)?;

    debug!("Extracting {:?} archive ({} bytes) to {:?}", kind, data.len(), dest);

    let result = match kind {
        ArchiveKind::TarGz => extract_tar_gz(data, dest),
        ArchiveKind::Zip => extract_zip(data, dest),
    };

    if result.is_err() {
        let _ = std::fs::remove_dir_all(dest);
    }
    result
}

fn extract_tar_gz(data: &[u8], dest: &Path) -> Result<(), DownloadError> {
    let decoder = GzDecoder::new(Cursor::new(data));
    let mut archive = Archive::new(decoder);
    archive.set_preserve_permissions(true);

    archive
        .unpack(dest)
        .map_err(|e| DownloadError::Extract(format!("Failed to extract tar: {}", e)))
}

fn extract_zip(data: &[u8], dest: &Path) -> Result<(), DownloadError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| DownloadError::Extract(format!("Failed to open zip: {}", e)))?;

    for i in 0..archive.len() {
        let mut file = archive
            .by_index(i)
            .map_err(|e| DownloadError::Extract(format!("Failed to read zip entry: {}", e)))?;

        // Entries escaping the destination are skipped
        let outpath = match file.enclosed_name() {
            Some(path) => dest.join(path),
            None => continue,
        };

        if file.is_dir() {
            std::fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        std::fs::write(&outpath, &content)?;

        #[cfg(unix)]
        if let Some(mode) = file.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
        }
    }

    Ok(())
}
