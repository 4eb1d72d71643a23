use std::collections::HashMap;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::{
    dto::{EmployeeFields, Upload, TEXT_FIELDS},
    repo_types::Employee,
};
use crate::{
    error::{ServiceError, ServiceResult},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/getUsers", get(list_users))
        .route("/getUser/:id", get(get_user))
}

pub fn write_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/post", post(create_user))
        .route("/updateUser/:id", put(update_user))
        .route("/deleteUser/:id", delete(delete_user))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> ServiceResult<Json<Vec<Employee>>> {
    let users = state.records.list().await?;
    debug!(count = users.len(), "listed employees");
    Ok(Json(users))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<Json<Employee>> {
    let id = parse_id(&id)?;
    Ok(Json(state.records.get(id).await?))
}

/// POST /post (multipart, `image` required)
#[instrument(skip(state, mp))]
pub async fn create_user(
    State(state): State<AppState>,
    mp: Multipart,
) -> ServiceResult<&'static str> {
    let (fields, photo) = read_form(mp).await?;
    let photo = photo.ok_or_else(|| ServiceError::invalid("image is required"))?;
    state.records.create(fields, photo).await?;
    Ok("Form submission successful")
}

/// PUT /updateUser/:id (multipart, `image` optional)
#[instrument(skip(state, mp))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    mp: Multipart,
) -> ServiceResult<&'static str> {
    let id = parse_id(&id)?;
    let (fields, photo) = read_form(mp).await?;
    state.records.update(id, fields, photo).await?;
    Ok("User updated successfully")
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<&'static str> {
    let id = parse_id(&id)?;
    state.records.delete(id).await?;
    Ok("User deleted successfully")
}

fn parse_id(raw: &str) -> ServiceResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::invalid(format!("malformed id {raw:?}")))
}

/// Reads the text fields and the optional `image` file.
///
/// An `image` part without a file name is the edit form echoing the current
/// reference and is skipped, as are parts with unknown names.
async fn read_form(mut mp: Multipart) -> ServiceResult<(EmployeeFields, Option<Upload>)> {
    let mut text = HashMap::new();
    let mut photo = None;

    while let Some(field) = mp.next_field().await.map_err(bad_multipart)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if name == "image" {
            let Some(file_name) = field.file_name().filter(|f| !f.is_empty()).map(str::to_owned)
            else {
                continue;
            };
            let content_type = field
                .content_type()
                .map(str::to_owned)
                .unwrap_or_else(|| "application/octet-stream".into());
            let body = field.bytes().await.map_err(bad_multipart)?;
            photo = Some(Upload {
                file_name,
                content_type,
                body,
            });
        } else if TEXT_FIELDS.contains(&name.as_str()) {
            let value = field.text().await.map_err(bad_multipart)?;
            text.insert(name, value);
        }
    }

    Ok((EmployeeFields::from_parts(text)?, photo))
}

fn bad_multipart(e: axum::extract::multipart::MultipartError) -> ServiceError {
    ServiceError::invalid(e.body_text())
}
