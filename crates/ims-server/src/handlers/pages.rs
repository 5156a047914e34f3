use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use ims_release::NewPage;
use ims_types::Page;

use super::{parse_id, parse_json, Body};
use crate::envelope::Envelope;
use crate::error::ApiResult;
use crate::state::AppState;

type Pages = Json<Envelope<Page>>;

pub async fn list_pages(
    State(state): State<AppState>,
    Path((project_id, release_id)): Path<(String, String)>,
) -> ApiResult<Pages> {
    let project_id = parse_id(&project_id, "projectId")?;
    let release_id = parse_id(&release_id, "releaseId")?;
    let pages = state.run(move |c| c.list_pages(project_id, release_id)).await?;
    Ok(Envelope::ok(pages))
}

/// `POST` with `{name, data}`, `data` being base64 image bytes.
pub async fn create_page(
    State(state): State<AppState>,
    Path((project_id, release_id)): Path<(String, String)>,
    body: Body,
) -> ApiResult<Pages> {
    let project_id = parse_id(&project_id, "projectId")?;
    let release_id = parse_id(&release_id, "releaseId")?;
    let upload: NewPage = parse_json(body)?;
    let page = state
        .run(move |c| c.create_page(project_id, release_id, &upload))
        .await?;
    Ok(Envelope::one(page))
}

/// Raw image bytes of the page named by the last segment.
pub async fn get_page(
    State(state): State<AppState>,
    Path((project_id, release_id, name)): Path<(String, String, String)>,
) -> ApiResult<Response> {
    let project_id = parse_id(&project_id, "projectId")?;
    let release_id = parse_id(&release_id, "releaseId")?;
    let (page, data) = state
        .run(move |c| c.get_page(project_id, release_id, &name))
        .await?;
    Ok(([(header::CONTENT_TYPE, page.mime_type.content_type())], data).into_response())
}

/// Delete by page id; the last segment must be numeric here.
pub async fn delete_page(
    State(state): State<AppState>,
    Path((project_id, release_id, page_id)): Path<(String, String, String)>,
) -> ApiResult<Json<Envelope<()>>> {
    let project_id = parse_id(&project_id, "projectId")?;
    let release_id = parse_id(&release_id, "releaseId")?;
    let page_id = parse_id(&page_id, "pageId")?;
    state
        .run(move |c| c.delete_page(project_id, release_id, page_id))
        .await?;
    Ok(Envelope::empty())
}
