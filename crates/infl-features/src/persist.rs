//! Atomic JSON artifact writes.

use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("artifact"), OsString::from);
    name.push(".tmp");
    path.with_file_name(name)
}

/// Writes `bytes` to a temporary sibling of `path`, then renames it into
/// place. A failure at any step leaves the previous file untouched.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp_path = tmp_sibling(path);
    let result = std::fs::File::create(&tmp_path)
        .and_then(|mut f| {
            f.write_all(bytes)?;
            f.sync_all()
        })
        .and_then(|()| std::fs::rename(&tmp_path, path));
    if result.is_err() {
        let _ = std::fs::remove_file(&tmp_path);
    }
    result
}
