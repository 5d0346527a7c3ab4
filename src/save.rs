use crate::behavior::Behavior;
use chrono::Local;
use log::{debug, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const IMAGE_BASE_DIR: &str = "data/images";

/// Creates `data/images/{behavior}` if missing and returns its path.
pub fn ensure_behavior_dir(base_dir: &Path, behavior: Behavior) -> io::Result<PathBuf> {
    let behavior_dir = base_dir.join(behavior.dir_name());
    if behavior_dir.exists() {
        info!("Directory already exists: {}", behavior_dir.display());
    } else {
        info!("Creating directory: {}", behavior_dir.display());
        fs::create_dir_all(&behavior_dir)?;
    }
    Ok(behavior_dir)
}

/// Scans existing files and returns max(index) + 1, or 0 for an empty set.
/// No counter is persisted and no locking is done, so two collectors writing
/// into the same directory can race each other.
pub fn next_index(behavior_dir: &Path, behavior: Behavior) -> io::Result<u32> {
    let mut max_index: Option<u32> = None;
    if behavior_dir.exists() {
        for entry in fs::read_dir(behavior_dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if let Some(index) = parse_index(&name.to_string_lossy(), behavior) {
                max_index = Some(max_index.map_or(index, |m| m.max(index)));
            }
        }
    }
    Ok(max_index.map_or(0, |m| m + 1))
}

/// Extracts the trailing index from names of the form
/// `{behavior}_<anything>_<digits>.jpg`. Anything else is ignored.
fn parse_index(filename: &str, behavior: Behavior) -> Option<u32> {
    let prefix = format!("{}_", behavior.dir_name());
    let stem = filename.strip_prefix(prefix.as_str())?.strip_suffix(".jpg")?;
    let digits = stem.rsplit('_').next()?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Builds `{behavior}_{YYYYMMDD_HHMMSS}_{index}.jpg` for the current time.
pub fn image_filename(behavior: Behavior, index: u32) -> String {
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!("{}_{}_{}.jpg", behavior.dir_name(), ts, index);
    debug!("Image filename {}", filename);
    filename
}
