use std::path::Path;

use anyhow::Context;
use axum::extract::multipart::Field;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use crate::{error::AppError, storage::StorageClient};

/// Writes an incoming multipart field to a temp file inside `dir`.
/// The file is deleted when the returned handle is dropped.
///
/// A body that breaks off or exceeds the upload limit is a client error;
/// local I/O trouble is an internal one.
pub async fn spool_to_temp(dir: &Path, field: &mut Field<'_>) -> Result<NamedTempFile, AppError> {
    let tmp = tempfile::Builder::new()
        .prefix("upload-")
        .tempfile_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    let mut file = tokio::fs::File::from_std(tmp.as_file().try_clone().context("clone temp file")?);

    let mut written = 0usize;
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await.context("write temp file")?;
        written += chunk.len();
    }
    file.flush().await.context("flush temp file")?;
    debug!(bytes = written, path = %tmp.path().display(), "upload spooled");
    Ok(tmp)
}

/// Forwards a spooled file to object storage and returns its durable URL.
pub async fn relay_file(
    storage: &dyn StorageClient,
    folder: &str,
    path: &Path,
    file_name: Option<&str>,
    content_type: &str,
) -> anyhow::Result<String> {
    let key = object_key(folder, file_name, content_type);
    storage
        .put_file(&key, path, content_type)
        .await
        .with_context(|| format!("put_file {}", key))?;
    Ok(storage.public_url(&key))
}

pub(crate) fn object_key(folder: &str, file_name: Option<&str>, content_type: &str) -> String {
    let ext = file_name
        .and_then(ext_from_name)
        .or_else(|| ext_from_mime(content_type).map(str::to_string))
        .unwrap_or_else(|| "bin".into());
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        format!("{}.{}", Uuid::new_v4(), ext)
    } else {
        format!("{}/{}.{}", folder, Uuid::new_v4(), ext)
    }
}

fn ext_from_name(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/heic" => Some("heic"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ext_from_mime() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("application/octet-stream"), None);
    }

    #[test]
    fn key_prefers_original_extension() {
        let key = object_key("uploads", Some("Photo.PNG"), "image/jpeg");
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with(".png"));
    }

    #[test]
    fn key_falls_back_to_mime_then_bin() {
        assert!(object_key("uploads", Some("noext"), "image/webp").ends_with(".webp"));
        assert!(object_key("uploads", None, "text/plain").ends_with(".bin"));
        assert!(object_key("uploads", Some("evil.p/hp"), "text/plain").ends_with(".bin"));
    }

    #[test]
    fn key_tolerates_slashes_in_folder() {
        let key = object_key("/uploads/", None, "image/png");
        assert!(key.starts_with("uploads/"));
        assert!(!key.starts_with("uploads//"));
    }
}
