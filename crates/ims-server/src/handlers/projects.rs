use axum::extract::{Path, Query, State};
use axum::Json;
use ims_release::{NewProject, ProjectUpdate};
use ims_types::Project;

use super::{parse_id, parse_json, Body, ListParams};
use crate::envelope::Envelope;
use crate::error::ApiResult;
use crate::state::AppState;

type Projects = Json<Envelope<Project>>;

/// `GET /projects?ordering=newest|oldest`, by creation time.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Projects> {
    let order = params.order()?;
    let projects = state.run(move |c| c.list_projects(order)).await?;
    Ok(Envelope::ok(projects))
}

pub async fn create_project(State(state): State<AppState>, body: Body) -> ApiResult<Projects> {
    let request: NewProject = parse_json(body)?;
    let project = state.run(move |c| c.create_project(&request)).await?;
    Ok(Envelope::one(project))
}

pub async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Projects> {
    let id = parse_id(&project_id, "projectId")?;
    let project = state.run(move |c| c.get_project(id)).await?;
    Ok(Envelope::one(project))
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    body: Body,
) -> ApiResult<Projects> {
    let id = parse_id(&project_id, "projectId")?;
    let update: ProjectUpdate = parse_json(body)?;
    let project = state.run(move |c| c.update_project(id, &update)).await?;
    Ok(Envelope::one(project))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> ApiResult<Json<Envelope<()>>> {
    let id = parse_id(&project_id, "projectId")?;
    state.run(move |c| c.delete_project(id)).await?;
    Ok(Envelope::empty())
}
