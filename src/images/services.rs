use std::path::Path;

use anyhow::Context;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::employees::dto::Upload;
use crate::storage::StorageClient;

/// Where an upload ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Object key inside the file store.
    pub key: String,
    /// Reference recorded on the employee.
    pub reference: String,
}

pub async fn store_upload(storage: &dyn StorageClient, upload: Upload) -> anyhow::Result<StoredFile> {
    anyhow::ensure!(!upload.body.is_empty(), "empty upload {:?}", upload.file_name);

    let key = object_key(&upload.file_name, &upload.content_type, OffsetDateTime::now_utc());
    let size = upload.body.len();
    let reference = storage
        .put_object(&key, upload.body, &upload.content_type)
        .await
        .with_context(|| format!("put_object {}", key))?;
    debug!(%key, size, "upload stored");
    Ok(StoredFile { key, reference })
}

/// `<unix millis>-<8 hex>` plus the file name's own extension, or one derived from the
/// content type.
fn object_key(file_name: &str, content_type: &str, now: OffsetDateTime) -> String {
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    let suffix = Uuid::new_v4().simple().to_string();
    let ext = ext_from_name(file_name).or_else(|| ext_from_mime(content_type));
    match ext {
        Some(ext) => format!("{}-{}.{}", millis, &suffix[..8], ext),
        None => format!("{}-{}", millis, &suffix[..8]),
    }
}

fn ext_from_name(file_name: &str) -> Option<&str> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
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
