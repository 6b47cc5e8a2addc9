use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::handlers::auth::require_customer;
use crate::services::storage::sanitize_filename;
use crate::state::AppState;

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Request bodies carry base64, which inflates the payload by a third.
pub const MAX_UPLOAD_BODY_BYTES: usize = MAX_UPLOAD_BYTES * 4 / 3 + 64 * 1024;

const ALLOWED_MIMETYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/heic",
    "application/pdf",
];

fn mimetype_from_extension(filename: &str) -> Option<&'static str> {
    let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "heic" => Some("image/heic"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// Stored files are served by extension, so the extension decides the type.
/// A declared mimetype must agree with it.
fn upload_mimetype(filename: &str, declared: Option<&str>) -> Result<&'static str, AppError> {
    let mimetype = mimetype_from_extension(filename)
        .filter(|m| ALLOWED_MIMETYPES.contains(m))
        .ok_or_else(|| {
            AppError::Validation(
                "file must be an image (jpg, png, gif, webp, heic) or a PDF".to_string(),
            )
        })?;

    if let Some(declared) = declared.map(str::trim).filter(|m| !m.is_empty()) {
        let lowered = declared.to_ascii_lowercase();
        let declared = match lowered.as_str() {
            "image/jpg" => "image/jpeg",
            other => other,
        };
        if declared != mimetype {
            return Err(AppError::Validation(format!(
                "declared type {declared} does not match file extension"
            )));
        }
    }

    Ok(mimetype)
}

/// Accepts bare base64 or a `data:<type>;base64,` URL.
fn decode_payload(file: &str) -> Result<Vec<u8>, AppError> {
    let encoded = match file.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => file,
    };
    STANDARD
        .decode(encoded.trim())
        .map_err(|_| AppError::Validation("file is not valid base64".to_string()))
}

// POST /api/upload/payment-proof
#[derive(Deserialize)]
pub struct UploadRequest {
    pub file: String,
    pub filename: String,
    pub mimetype: Option<String>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    url: String,
    filename: String,
}

pub async fn upload_payment_proof(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<UploadRequest>,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let customer = require_customer(&headers, &state)?;

    if body.filename.trim().is_empty() {
        return Err(AppError::Validation("filename is required".to_string()));
    }

    // Checked on the name that will actually be written to disk.
    let filename = sanitize_filename(&body.filename);
    let mimetype = upload_mimetype(&filename, body.mimetype.as_deref())?;

    let bytes = decode_payload(&body.file)?;
    if bytes.is_empty() {
        return Err(AppError::Validation("file is empty".to_string()));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation("file exceeds the 5 MB limit".to_string()));
    }

    let size = bytes.len();
    let url = state.files.store(&customer.id, &filename, bytes).await?;

    tracing::info!(customer_id = %customer.id, size, mimetype = %mimetype, "payment proof uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse { url, filename }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_payload() {
        assert_eq!(decode_payload("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(
            decode_payload("data:image/png;base64,aGVsbG8=").unwrap(),
            b"hello"
        );
        assert!(matches!(decode_payload("***"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_upload_mimetype_follows_extension() {
        assert_eq!(upload_mimetype("receipt.png", None).unwrap(), "image/png");
        assert_eq!(
            upload_mimetype("receipt.JPG", Some("image/jpg")).unwrap(),
            "image/jpeg"
        );
        assert_eq!(
            upload_mimetype("proof.pdf", Some("application/pdf")).unwrap(),
            "application/pdf"
        );

        assert!(matches!(
            upload_mimetype("receipt.html", Some("image/png")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            upload_mimetype("receipt.svg", None),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            upload_mimetype("receipt.png", Some("application/pdf")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_mimetype_from_extension() {
        assert_eq!(mimetype_from_extension("receipt.JPG"), Some("image/jpeg"));
        assert_eq!(mimetype_from_extension("proof.pdf"), Some("application/pdf"));
        assert_eq!(mimetype_from_extension("script.sh"), None);
        assert_eq!(mimetype_from_extension("noext"), None);
    }
}
