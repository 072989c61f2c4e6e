//! Image upload route.

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{Field, MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use serde::Serialize;
use tracing::instrument;

use crate::error::Result;
use crate::extract::ApiPath;
use crate::middleware::RequireAdmin;
use crate::services::uploads::{UploadError, UploadKind, UploadStore};
use crate::state::AppState;

/// Preferred multipart field name for the file.
const FILE_FIELD: &str = "file";

/// Successful upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub image_url: String,
}

/// A file part read into memory.
struct UploadedFile {
    file_name: String,
    bytes: Vec<u8>,
}

/// Store one image for `kind`.
///
/// POST /upload/{kind}
///
/// Takes the `file` field if present, otherwise the first part that carries
/// a filename.
#[instrument(skip_all, fields(admin = %admin.sub, kind = %kind))]
pub async fn upload(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiPath(kind): ApiPath<String>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let kind: UploadKind = kind.parse()?;
    let store = UploadStore::new(&state.config().uploads);

    let mut multipart = multipart.map_err(|e| UploadError::Multipart(e.body_text()))?;
    let file = read_file(&mut multipart, store.max_bytes())
        .await?
        .ok_or(UploadError::MissingFile)?;

    let stored = store.save(kind, &file.file_name, &file.bytes).await?;

    Ok(Json(UploadResponse {
        success: true,
        image_url: stored.url,
    }))
}

/// Pick the file part out of a multipart body.
async fn read_file(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> std::result::Result<Option<UploadedFile>, UploadError> {
    let mut fallback = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e, max_bytes))?
    {
        let is_file_field = field.name() == Some(FILE_FIELD);
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        if !is_file_field && fallback.is_some() {
            continue;
        }

        let file = UploadedFile {
            file_name,
            bytes: read_field(field, max_bytes).await?,
        };
        if is_file_field {
            return Ok(Some(file));
        }
        fallback = Some(file);
    }

    Ok(fallback)
}

async fn read_field(field: Field<'_>, max_bytes: usize) -> std::result::Result<Vec<u8>, UploadError> {
    let bytes = field
        .bytes()
        .await
        .map_err(|e| multipart_error(&e, max_bytes))?;
    if bytes.len() > max_bytes {
        return Err(UploadError::TooLarge { max_bytes });
    }
    Ok(bytes.to_vec())
}

fn multipart_error(err: &MultipartError, max_bytes: usize) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge { max_bytes }
    } else {
        UploadError::Multipart(err.body_text())
    }
}
