use axum::extract::{Path, Query, State};
use axum::Json;
use ims_release::{NewRelease, ReleaseUpdate};
use ims_types::Release;

use super::{parse_id, parse_json, Body, ListParams};
use crate::envelope::Envelope;
use crate::error::ApiResult;
use crate::state::AppState;

type Releases = Json<Envelope<Release>>;

/// `GET .../releases?ordering=newest|oldest`, by release time.
pub async fn list_releases(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    Query(params): Query<ListParams>,
) -> ApiResult<Releases> {
    let project_id = parse_id(&project_id, "projectId")?;
    let order = params.order()?;
    let releases = state.run(move |c| c.list_releases(project_id, order)).await?;
    Ok(Envelope::ok(releases))
}

pub async fn create_release(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    body: Body,
) -> ApiResult<Releases> {
    let project_id = parse_id(&project_id, "projectId")?;
    let request: NewRelease = parse_json(body)?;
    let release = state.run(move |c| c.create_release(project_id, &request)).await?;
    Ok(Envelope::one(release))
}

pub async fn get_release(
    State(state): State<AppState>,
    Path((project_id, release_id)): Path<(String, String)>,
) -> ApiResult<Releases> {
    let project_id = parse_id(&project_id, "projectId")?;
    let release_id = parse_id(&release_id, "releaseId")?;
    let release = state.run(move |c| c.get_release(project_id, release_id)).await?;
    Ok(Envelope::one(release))
}

/// `PUT` with `{identifier, version, status}`; edit-guard violations are 417.
pub async fn update_release(
    State(state): State<AppState>,
    Path((project_id, release_id)): Path<(String, String)>,
    body: Body,
) -> ApiResult<Releases> {
    let project_id = parse_id(&project_id, "projectId")?;
    let release_id = parse_id(&release_id, "releaseId")?;
    let update: ReleaseUpdate = parse_json(body)?;
    let release = state
        .run(move |c| c.update_release(project_id, release_id, &update))
        .await?;
    Ok(Envelope::one(release))
}

pub async fn delete_release(
    State(state): State<AppState>,
    Path((project_id, release_id)): Path<(String, String)>,
) -> ApiResult<Json<Envelope<()>>> {
    let project_id = parse_id(&project_id, "projectId")?;
    let release_id = parse_id(&release_id, "releaseId")?;
    state.run(move |c| c.delete_release(project_id, release_id)).await?;
    Ok(Envelope::empty())
}
