use crate::error::AppError;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;
/// Public URL prefix under which `UPLOAD_DIR` is served.
pub const PUBLIC_PREFIX: &str = "/uploads/";

const ALLOWED_IMAGE_TYPES: [(&str, &str); 4] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// Sniffs the content and returns the file extension for accepted image types.
pub fn detect_image(bytes: &[u8]) -> Result<&'static str, AppError> {
    if bytes.is_empty() {
        return Err(AppError::Validation("Please choose an image to upload".into()));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation("Image must be 2 MB or smaller".into()));
    }
    let mime = infer::get(bytes).map(|kind| kind.mime_type());
    ALLOWED_IMAGE_TYPES
        .iter()
        .find(|(allowed, _)| Some(*allowed) == mime)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| AppError::Validation("Only JPEG, PNG, GIF or WebP images are allowed".into()))
}

/// Writes the image under `<upload_dir>/<subdir>/` via a temp file and rename.
/// Returns the public path (`/uploads/<subdir>/<file>`).
pub async fn store_image(upload_dir: &str, subdir: &str, bytes: &[u8]) -> Result<String, AppError> {
    let ext = detect_image(bytes)?;
    let dir = Path::new(upload_dir).join(subdir);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| AppError::InternalWithMsg(format!("Cannot create upload dir: {}", e)))?;

    let id = Uuid::new_v4();
    let file_name = format!("{}.{}", id, ext);
    let tmp_path = dir.join(format!(".{}.tmp", id));
    let final_path = dir.join(&file_name);

    if let Err(e) = tokio::fs::write(&tmp_path, bytes).await {
        return Err(AppError::InternalWithMsg(format!("Cannot write upload: {}", e)));
    }
    if let Err(e) = tokio::fs::rename(&tmp_path, &final_path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(AppError::InternalWithMsg(format!("Cannot move upload into place: {}", e)));
    }

    info!(path = %final_path.display(), "Stored upload");
    Ok(format!("{}{}/{}", PUBLIC_PREFIX, subdir, file_name))
}

/// Maps a public upload path back to disk. Rejects anything outside the upload dir.
pub fn resolve_public_path(upload_dir: &str, public_path: &str) -> Option<PathBuf> {
    let relative = public_path.strip_prefix(PUBLIC_PREFIX)?;
    if relative.is_empty() || relative.split('/').any(|part| part.is_empty() || part == "..") {
        return None;
    }
    Some(Path::new(upload_dir).join(relative))
}

/// Best effort; failures are only logged.
pub async fn remove_upload(upload_dir: &str, public_path: &str) {
    let Some(path) = resolve_public_path(upload_dir, public_path) else {
        warn!(public_path, "Refusing to delete path outside upload dir");
        return;
    };
    if let Err(e) = tokio::fs::remove_file(&path).await {
        warn!(path = %path.display(), error = %e, "Could not delete old upload");
    }
}
