use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use super::parse_id;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn get_thumbnail(
    State(state): State<AppState>,
    Path((project_id, release_id, name)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    let project_id = parse_id(&project_id, "projectId")?;
    let release_id = parse_id(&release_id, "releaseId")?;
    let (page, thumb) = state
        .run(move |c| c.thumbnail(project_id, release_id, &name))
        .await?;
    Ok(([(header::CONTENT_TYPE, page.mime_type.content_type())], thumb).into_response())
}
