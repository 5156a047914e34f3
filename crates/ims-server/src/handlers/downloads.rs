use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};

use super::parse_id;
use crate::error::ApiResult;
use crate::state::AppState;

/// Serve the zip archive of a released release. The last segment must equal
/// the release's canonical archive name.
pub async fn download_archive(
    State(state): State<AppState>,
    Path((project_id, release_id, name)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    let project_id = parse_id(&project_id, "projectId")?;
    let release_id = parse_id(&release_id, "releaseId")?;
    let download = state
        .run(move |c| c.download_archive(project_id, release_id, &name))
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/zip"));
    if let Ok(etag) = HeaderValue::from_str(&format!("\"{}\"", download.archive.checksum)) {
        headers.insert(header::ETAG, etag);
    }
    // names that cannot form a header value are served without a filename
    if let Ok(disposition) =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", download.file_name))
    {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }
    Ok((headers, download.archive.bytes).into_response())
}
