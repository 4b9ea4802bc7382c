use crate::utils::logging::*;
use futures::StreamExt;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio_stream::wrappers::ReadDirStream;

pub const PAIRING_IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];
pub const SAMPLE_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
pub const LABEL_EXTENSION: &str = "txt";

/// Extension matched case-insensitively.
pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|extension| extensions.iter().any(|candidate| candidate.eq_ignore_ascii_case(extension)))
        .unwrap_or(false)
}

/// Extension matched exactly, the way a `*.jpg` glob does.
pub fn has_exact_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|extension| extensions.contains(&extension))
        .unwrap_or(false)
}

pub fn file_stem(path: &Path) -> String {
    path.file_stem().map(|stem| stem.to_string_lossy().to_string()).unwrap_or_default()
}

pub fn file_name(path: &Path) -> String {
    path.file_name().map(|name| name.to_string_lossy().to_string()).unwrap_or_default()
}

/// Regular files of `folder` accepted by `filter`, sorted by path.
pub async fn list_files<F>(folder: &Path, filter: F) -> Result<Vec<PathBuf>, LogEntry>
where
    F: Fn(&Path) -> bool,
{
    let read_dir = fs::read_dir(folder).await
        .map_err(|err| error_entry!(IOEntry::ReadDirectoryError(folder.display(), err)))?;
    let mut files: Vec<PathBuf> = ReadDirStream::new(read_dir)
        .filter_map(|entry| async move { entry.ok().map(|entry| entry.path()) })
        .filter(|path| {
            let is_file = path.is_file();
            async move { is_file }
        })
        .collect()
        .await;
    files.retain(|path| filter(path));
    files.sort();
    Ok(files)
}

pub fn stems(paths: &[PathBuf]) -> BTreeSet<String> {
    paths.iter().map(|path| file_stem(path)).collect()
}

pub async fn is_directory(path: &Path) -> bool {
    fs::metadata(path).await.map(|metadata| metadata.is_dir()).unwrap_or(false)
}

pub async fn create_folder(path: &Path) -> Result<(), LogEntry> {
    fs::create_dir_all(path).await
        .map_err(|err| error_entry!(IOEntry::CreateDirectoryError(path.display(), err)))
}

/// Up to `count` items drawn without replacement, reproducible for a given seed.
pub fn sample<T: Clone>(items: &[T], count: usize, seed: u64) -> Vec<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    items.choose_multiple(&mut rng, count.min(items.len())).cloned().collect()
}

/// All items in a seeded random order.
pub fn shuffled<T: Clone>(items: &[T], seed: u64) -> Vec<T> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut items = items.to_vec();
    items.shuffle(&mut rng);
    items
}
