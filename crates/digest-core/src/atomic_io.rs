use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::time_utils::current_unix_timestamp_ms;

/// Writes text through a sibling temp file and a rename so readers never
/// observe a half-written artifact. Missing parent directories are created.
pub fn write_text_atomic(path: &Path, content: &str) -> Result<()> {
    let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
        bail!("artifact path '{}' has no usable file name", path.display());
    };
    if path.is_dir() {
        bail!("artifact path '{}' points at a directory", path.display());
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;

    let staging = dir.join(format!(
        ".{file_name}.tmp-{}-{}",
        std::process::id(),
        current_unix_timestamp_ms()
    ));
    let mut file = File::create(&staging)
        .with_context(|| format!("failed to create staging file {}", staging.display()))?;
    file.write_all(content.as_bytes())
        .and_then(|()| file.sync_all())
        .with_context(|| format!("failed to write staging file {}", staging.display()))?;
    drop(file);

    if let Err(error) = fs::rename(&staging, path) {
        let _ = fs::remove_file(&staging);
        return Err(error).with_context(|| {
            format!("failed to move {} into place at {}", staging.display(), path.display())
        });
    }
    Ok(())
}

/// Serializes `value` as 2-space indented JSON with a trailing newline and
/// writes it atomically.
pub fn write_json_pretty_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut payload = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialize {}", path.display()))?;
    payload.push('\n');
    write_text_atomic(path, &payload)
}
