use crate::utils::logging::*;
use image::RgbImage;
use std::path::{Path, PathBuf};
use tokio::task;

/// Decodes any format the `image` crate knows into 8-bit RGB.
pub async fn read_rgb(path: &Path) -> Result<RgbImage, LogEntry> {
    let source = path.to_path_buf();
    let decoded = task::spawn_blocking(move || image::open(source))
        .await
        .map_err(|err| error_entry!(SystemEntry::TaskPanickedError(err)))?;
    decoded
        .map(|image| image.to_rgb8())
        .map_err(|err| error_entry!(IOEntry::DecodeImageError(path.display(), err)))
}

/// Encodes by the extension of `path`.
pub async fn write_rgb(image: RgbImage, path: &Path) -> Result<(), LogEntry> {
    let target: PathBuf = path.to_path_buf();
    let encoded = task::spawn_blocking(move || image.save(target))
        .await
        .map_err(|err| error_entry!(SystemEntry::TaskPanickedError(err)))?;
    encoded.map_err(|err| error_entry!(IOEntry::EncodeImageError(path.display(), err)))
}
