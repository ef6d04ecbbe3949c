use std::sync::Arc;

use axum::{
    http::{header::CACHE_CONTROL, HeaderValue},
    routing::get,
    Router,
};
use comms::endpoint::{DISPLAY_PATH, MAIN_PAGE_PATH};
use tokio::sync::Mutex;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::room::RoomManager;

pub mod render;
pub mod room;
pub mod routes;

/// State shared by every request handler
#[derive(Debug)]
pub struct AppState {
    /// Every POST has to carry this value in its `formPassword` field
    pub form_password: String,
    pub rooms: Mutex<RoomManager>,
}

impl AppState {
    pub fn new(form_password: &str, rooms: RoomManager) -> Self {
        AppState {
            form_password: String::from(form_password),
            rooms: Mutex::new(rooms),
        }
    }
}

/// Builds the router serving the room page and the main page.
///
/// Responses are marked `no-store`: a poll answered from a cache would look like a change.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            DISPLAY_PATH,
            get(routes::display_page).post(routes::display_command),
        )
        .route(
            MAIN_PAGE_PATH,
            get(routes::main_page).post(routes::main_page_command),
        )
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
