use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::io::AsyncWriteExt;

use crate::error::{FileRole, OrangeBookError};

pub(crate) async fn read_to_string(path: &Path, role: FileRole) -> Result<String, OrangeBookError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| OrangeBookError::FileRead {
            role,
            path: path.to_path_buf(),
            source,
        })
}

fn write_err(path: &Path) -> impl FnOnce(std::io::Error) -> OrangeBookError + '_ {
    move |source| OrangeBookError::FileWrite {
        path: path.to_path_buf(),
        source,
    }
}

/// Writes `content` next to `path` under a temporary name, then renames it
/// into place so a failed run never leaves a truncated report behind.
pub(crate) async fn write_atomic(path: &Path, content: &[u8]) -> Result<(), OrangeBookError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
        return Err(OrangeBookError::InvalidArgument(format!(
            "Invalid output path {}",
            path.display()
        )));
    };
    tokio::fs::create_dir_all(&dir).await.map_err(write_err(path))?;

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let mut opened = None;
    for attempt in 0..32_u32 {
        let candidate = dir.join(format!(
            ".{}.{}.{}.tmp",
            file_name,
            std::process::id(),
            seed.saturating_add(attempt as u128)
        ));
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(file) => {
                opened = Some((candidate, file));
                break;
            }
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(write_err(path)(err)),
        }
    }
    let Some((tmp_path, mut file)) = opened else {
        return Err(write_err(path)(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "Unable to allocate temporary output file",
        )));
    };

    let written = async {
        file.write_all(content).await?;
        file.flush().await?;
        file.sync_all().await
    }
    .await;
    drop(file);
    if let Err(err) = written {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(path)(err));
    }

    if let Err(err) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(path)(err));
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn temp_path(prefix: &str, suffix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "{}-{}-{}{}",
            prefix,
            std::process::id(),
            nanos,
            suffix
        ))
    }

    #[tokio::test]
    async fn write_atomic_replaces_existing_file() {
        let path = temp_path("orangebook-atomic", ".csv");
        std::fs::write(&path, "old").expect("seed");

        write_atomic(&path, b"new contents").await.expect("write");
        let contents = std::fs::read_to_string(&path).expect("read back");
        std::fs::remove_file(&path).expect("cleanup");

        assert_eq!(contents, "new contents");
    }

    #[tokio::test]
    async fn read_to_string_reports_role_on_missing_file() {
        let path = temp_path("orangebook-missing", ".txt");
        let err = read_to_string(&path, FileRole::Patents)
            .await
            .expect_err("missing file should fail");
        assert!(matches!(
            err,
            OrangeBookError::FileRead {
                role: FileRole::Patents,
                ..
            }
        ));
    }
}
