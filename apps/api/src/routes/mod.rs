pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::diary::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/diary/create", post(handlers::handle_create_entry))
        .route(
            "/diary/user/:user_id",
            get(handlers::handle_list_user_entries),
        )
        .route("/diary/:id", get(handlers::handle_get_entry))
        .with_state(state)
}
