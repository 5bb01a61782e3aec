//! Object naming for uploaded images.

use chrono::Utc;
use tablekit_core::StoreError;
use uuid::Uuid;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// `20261014T093000-1a2b3c4d-front_table.png`
pub fn object_name(file_name: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        Utc::now().format("%Y%m%dT%H%M%S"),
        &id[..8],
        sanitize(file_name)
    )
}

/// Rejects empty and oversized uploads.
pub fn check_upload(file_name: &str, bytes: &[u8]) -> Result<(), StoreError> {
    let reason = if bytes.is_empty() {
        "file is empty".to_string()
    } else if bytes.len() > MAX_UPLOAD_BYTES {
        format!("{} bytes exceeds the {} byte limit", bytes.len(), MAX_UPLOAD_BYTES)
    } else {
        return Ok(());
    };
    Err(StoreError::Upload {
        file_name: file_name.to_string(),
        reason,
    })
}

fn sanitize(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches(['.', '_']).is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}
