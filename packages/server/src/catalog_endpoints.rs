//! Catalog Endpoints
//!
//! Tags, partners, categories and clients share one set of generic handlers;
//! [`catalog_routes`] mounts them under the kind's list and record paths.
//!
//! # Endpoints (per kind)
//!
//! - `GET /api/tasks/{plural}` - List records in stored order
//! - `POST /api/tasks/{singular}` - Create from `{ "{singular}": partial }`
//! - `PATCH /api/tasks/{singular}` - Update from `{ "id", "{singular}": partial }`
//! - `DELETE /api/tasks/{singular}?id=` - Delete and cascade over tasks
//! - `GET /api/tasks/workhours` - Work-hour catalogue

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{AppState, HttpError};
use taskboard_core::{CatalogRecord, Category, Client, EntityKind, Partner, Tag, ValidationError};

/// `?id=` query for single-record endpoints
#[derive(Debug, Deserialize)]
pub struct IdQuery {
    pub id: String,
}

/// Split a request body into its top-level fields
pub(crate) fn body_object(body: Value) -> Result<Map<String, Value>, HttpError> {
    match body {
        Value::Object(object) => Ok(object),
        other => Err(ValidationError::NotAnObject(other.to_string()).into()),
    }
}

/// Pull the `id` and the partial stored under the kind's key out of an
/// update body
///
/// A body without that key updates nothing and returns the record as is.
pub(crate) fn update_parts(body: Value, kind: EntityKind) -> Result<(String, Value), HttpError> {
    let mut body = body_object(body)?;

    let id = match body.remove("id") {
        Some(Value::String(id)) => id,
        Some(other) => {
            return Err(ValidationError::invalid_record(kind, format!("id must be a string, got: {}", other)).into())
        }
        None => return Err(ValidationError::MissingField("id".to_string()).into()),
    };
    let partial = body
        .remove(kind.singular())
        .unwrap_or_else(|| Value::Object(Map::new()));

    Ok((id, partial))
}

async fn list_records<R: CatalogRecord>(State(state): State<AppState>) -> Json<Vec<R>> {
    Json(state.backend.lock().await.list::<R>())
}

async fn create_record<R: CatalogRecord>(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<R>, HttpError> {
    let Json(body) = body?;
    let key = R::KIND.singular();

    let payload = body_object(body)?
        .remove(key)
        .ok_or_else(|| ValidationError::MissingField(key.to_string()))?;

    let created = state.backend.lock().await.create::<R>(payload)?;
    Ok(Json(created))
}

async fn update_record<R: CatalogRecord>(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Option<R>>, HttpError> {
    let Json(body) = body?;
    let (id, partial) = update_parts(body, R::KIND)?;

    let updated = state.backend.lock().await.update::<R>(&id, partial)?;
    Ok(Json(updated))
}

async fn delete_record<R: CatalogRecord>(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Json<bool>, HttpError> {
    let Query(IdQuery { id }) = query?;
    Ok(Json(state.backend.lock().await.delete::<R>(&id)))
}

async fn list_work_hours(State(state): State<AppState>) -> Json<Vec<f64>> {
    Json(state.backend.lock().await.work_hours())
}

/// Routes for one catalog kind
pub fn catalog_routes<R: CatalogRecord>() -> Router<AppState> {
    let kind = R::KIND;

    Router::new()
        .route(&format!("/api/tasks/{}", kind.plural()), get(list_records::<R>))
        .route(
            &format!("/api/tasks/{}", kind.singular()),
            post(create_record::<R>)
                .patch(update_record::<R>)
                .delete(delete_record::<R>),
        )
}

/// Create router with every catalog endpoint
pub fn routes(state: AppState) -> Router {
    Router::new()
        .merge(catalog_routes::<Tag>())
        .merge(catalog_routes::<Partner>())
        .merge(catalog_routes::<Category>())
        .merge(catalog_routes::<Client>())
        .route("/api/tasks/workhours", get(list_work_hours))
        .with_state(state)
}
