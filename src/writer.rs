use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::{Error, Result};

/// Writes `bytes` to `path`, replacing any existing file.
///
/// The bytes go to a hidden staging file next to the target, which is flushed,
/// closed and then renamed over `path`, so a reader sees either the previous
/// file or the complete new one.
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let write_err = |e| Error::OutputWrite {
        path: path.to_path_buf(),
        source: e,
    };

    match fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(Error::OutputDirMissing(dir.to_path_buf())),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::OutputDirMissing(dir.to_path_buf()))
        }
        Err(e) => return Err(write_err(e)),
    }

    let staging = staging_path(path);

    if let Err(e) = write_staging(&staging, bytes).await {
        let _ = fs::remove_file(&staging).await;
        return Err(write_err(e));
    }

    if let Err(e) = fs::rename(&staging, path).await {
        let _ = fs::remove_file(&staging).await;
        return Err(write_err(e));
    }

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

async fn write_staging(staging: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(staging).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".partial");
    path.with_file_name(name)
}
