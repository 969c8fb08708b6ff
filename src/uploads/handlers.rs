use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use tracing::{info, instrument};

use super::services::{relay_file, spool_to_temp};
use crate::{auth::extractors::AuthUser, error::AppError, state::AppState};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    #[serde(rename = "cloudinaryUrl")]
    pub url: String,
}

pub fn upload_routes(max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/upload", post(upload_image))
        .layer(DefaultBodyLimit::max(max_bytes))
}

/// POST /upload, multipart field `image`.
#[instrument(skip(state, mp))]
pub async fn upload_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(mut field) = mp.next_field().await? {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let cfg = &state.config.upload;
        // Dropping `tmp` removes the local copy on every path below.
        let tmp = spool_to_temp(&cfg.tmp_dir, &mut field).await?;
        let url = relay_file(
            state.storage.as_ref(),
            &cfg.folder,
            tmp.path(),
            file_name.as_deref(),
            &content_type,
        )
        .await
        .map_err(AppError::UploadFailed)?;
        drop(tmp);

        info!(%user_id, %url, "upload relayed");
        return Ok(Json(UploadResponse {
            message: "Upload successful",
            url,
        }));
    }

    Err(AppError::BadRequest("image file is required".into()))
}
