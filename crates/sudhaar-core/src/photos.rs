use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use sudhaar_types::PortalError;

/// Complaints embed their photos as data URLs, so a record is
/// self-contained and renders without a separate file fetch.
pub fn encode_image(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, B64.encode(bytes))
}

pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "svg" => Some("image/svg+xml"),
        _ => None,
    }
}

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(mime_for_extension)
}

/// Background encode of one image file into a data URL, tied to the
/// lifetime of its handle: dropping or cancelling the task means a result
/// that arrives afterwards is discarded, never applied to torn-down state.
pub struct EncodeTask {
    token: CancellationToken,
    handle: Option<JoinHandle<Result<Option<String>, PortalError>>>,
}

impl EncodeTask {
    pub fn spawn(path: PathBuf) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => Ok(None),
                result = encode_file(path) => result.map(Some),
            }
        });

        Self {
            token,
            handle: Some(handle),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Await the encoded data URL; `Ok(None)` means the task was cancelled
    /// and its result discarded.
    pub async fn finish(mut self) -> Result<Option<String>, PortalError> {
        let Some(handle) = self.handle.take() else {
            return Ok(None);
        };

        match handle.await {
            Ok(result) => result,
            Err(join) if join.is_cancelled() => Ok(None),
            Err(join) => Err(PortalError::Storage(anyhow::anyhow!(
                "photo encode task failed: {}",
                join
            ))),
        }
    }
}

impl Drop for EncodeTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn encode_file(path: PathBuf) -> Result<String, PortalError> {
    let mime = mime_for_path(&path)
        .ok_or_else(|| PortalError::validation("unsupported image type"))?;

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        PortalError::Storage(anyhow::anyhow!("reading {} failed: {}", path.display(), e))
    })?;

    Ok(encode_image(mime, &bytes))
}
