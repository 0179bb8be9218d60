use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};

/// Save a backend artifact under `dir`, keeping only the base name of
/// `file_name`.
///
/// An existing file is never overwritten; the call fails instead.
pub async fn save_new(dir: &Path, file_name: &str, contents: &[u8]) -> Result<PathBuf> {
    let Some(base) = Path::new(file_name).file_name() else {
        return Err(Error::validation(
            format!("{file_name} has no file name to save under"),
            Some("download_file".to_string()),
        ));
    };
    let path = dir.join(base);
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::AlreadyExists => Error::io(
                format!("{} already exists; not overwriting it", path.display()),
                e,
            ),
            _ => Error::io(format!("Failed to create {}", path.display()), e),
        })?;
    file.write_all(contents)
        .await
        .map_err(|e| Error::io(format!("Failed to write {}", path.display()), e))?;
    file.flush()
        .await
        .map_err(|e| Error::io(format!("Failed to write {}", path.display()), e))?;
    Ok(path)
}
