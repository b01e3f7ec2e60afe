//! Template management routes

use crate::{
    AppState,
    error::Result,
    models::{MessageResponse, parse_template_input},
};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use pushboard_store::{CreatedTemplate, Template, TemplateSummary, UpdatedTemplate};
use tracing::{debug, info};

/// Create template routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_templates).post(create_template))
        .route(
            "/{id}",
            get(get_template)
                .put(update_template)
                .delete(delete_template),
        )
}

/// List all templates, most recently updated first
async fn list_templates(State(state): State<AppState>) -> Result<Json<Vec<TemplateSummary>>> {
    debug!("Listing templates");

    let templates = state.storage.list_templates().await?;
    Ok(Json(templates))
}

/// Get a single template by id
async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Template>> {
    debug!("Getting template: {}", id);

    let template = state.storage.get_template(&id).await?;
    Ok(Json(template))
}

/// Create a new template
async fn create_template(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatedTemplate>)> {
    let input = parse_template_input(&body)?;
    let created = state.storage.create_template(input).await?;

    info!("Created template {}", created.id);
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update fields of an existing template
async fn update_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<UpdatedTemplate>> {
    let input = parse_template_input(&body)?;
    let updated = state.storage.update_template(&id, input).await?;

    info!("Updated template {}", updated.id);
    Ok(Json(updated))
}

/// Delete a template
async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    state.storage.delete_template(&id).await?;

    info!("Deleted template {}", id);
    Ok(Json(MessageResponse::new("Template deleted")))
}
