//! Axum server and routes.

use crate::error::ApiError;
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use miniapp_types::{
    event_url, CreateEventRequest, DeletedResponse, EventChanges, EventRecord, EventStore,
    EventSummary, LandingResponse, NewEvent, NewEventForm, PatchEventRequest,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const NEW_EVENT_FORM: &str = include_str!("../templates/new_event.html");

pub struct AppState {
    pub store: Arc<dyn EventStore + Send + Sync>,
}

/// Method filtering lives here: a method not routed for a path gets 405 from Axum.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handle_landing))
        .route(
            "/new-event-form",
            get(handle_new_event_form).post(handle_submit_event_form),
        )
        .route("/events", get(handle_list_events).post(handle_create_event))
        .route(
            "/events/:id",
            get(handle_get_event)
                .delete(handle_delete_event)
                .patch(handle_patch_event),
        )
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// 302 to the full view of `id`.
fn redirect_to_event(id: i64) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, event_url(id))]).into_response()
}

/// Ids that are not integers can never match a row.
fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::NotFound(raw.to_string()))
}

async fn load_event(state: &AppState, raw_id: &str) -> Result<EventRecord, ApiError> {
    let id = parse_id(raw_id)?;
    state
        .store
        .get(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(id.to_string()))
}

async fn create_event(state: &AppState, new: NewEvent) -> Result<Response, ApiError> {
    let record = state.store.insert(&new).await?;
    tracing::info!(id = record.id, status = ?record.status, event = ?record.event, "event created");
    Ok(redirect_to_event(record.id))
}

async fn handle_landing() -> Json<LandingResponse> {
    Json(LandingResponse {
        what_to_see_here: "nothing".to_string(),
        check_rather: "/new-event-form".to_string(),
    })
}

async fn handle_new_event_form() -> Html<&'static str> {
    Html(NEW_EVENT_FORM)
}

async fn handle_submit_event_form(
    State(state): State<Arc<AppState>>,
    form: Result<Form<NewEventForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let Form(form) = form?;
    create_event(&state, form.into()).await
}

async fn handle_list_events(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<EventSummary>>, ApiError> {
    let events = state.store.list().await?;
    Ok(Json(events.iter().map(EventRecord::summary).collect()))
}

async fn handle_create_event(
    State(state): State<Arc<AppState>>,
    req: Result<Json<CreateEventRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = req?;
    create_event(&state, req.into()).await
}

async fn handle_get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EventRecord>, ApiError> {
    Ok(Json(load_event(&state, &id).await?))
}

async fn handle_delete_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let record = load_event(&state, &id).await?;
    if !state.store.delete(record.id).await? {
        return Err(ApiError::NotFound(record.id.to_string()));
    }
    tracing::info!(id = record.id, "event deleted");
    Ok(Json(DeletedResponse {
        deleted: true,
        id: record.id,
    }))
}

async fn handle_patch_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    req: Result<Json<PatchEventRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let record = load_event(&state, &id).await?;
    let Json(req) = req?;
    let changes = EventChanges::try_from(req)?;
    if !changes.is_touched() {
        return Err(ApiError::NoChanges);
    }
    let updated = state
        .store
        .update(record.id, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFound(record.id.to_string()))?;
    tracing::info!(id = updated.id, status = ?updated.status, event = ?updated.event, "event updated");
    Ok(redirect_to_event(updated.id))
}

async fn handle_health() -> &'static str {
    "ok"
}
