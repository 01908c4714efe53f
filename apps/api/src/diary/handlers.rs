use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::diary::pipeline::{create_entry, CreateEntryRequest};
use crate::errors::AppError;
use crate::models::entry::DiaryEntry;
use crate::state::AppState;

/// A negative limit means "no limit", as SQLite's `LIMIT` treats it.
#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

impl LimitQuery {
    fn bounded(&self) -> Option<u32> {
        self.limit.and_then(|limit| u32::try_from(limit).ok())
    }
}

/// POST /diary/create
pub async fn handle_create_entry(
    State(state): State<AppState>,
    Json(req): Json<CreateEntryRequest>,
) -> Result<Json<DiaryEntry>, AppError> {
    let entry = create_entry(&state.store, state.enhancer.as_ref(), req).await?;
    Ok(Json(entry))
}

/// GET /diary/user/:user_id
pub async fn handle_list_user_entries(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<DiaryEntry>>, AppError> {
    let entries = state.store.list_by_user(&user_id, params.bounded()).await?;
    Ok(Json(entries))
}

/// GET /diary/:id
pub async fn handle_get_entry(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<DiaryEntry>, AppError> {
    state
        .store
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Entry {id} not found")))
}
