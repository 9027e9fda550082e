mod routes;

pub use routes::create_router;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::app::ChatService;
use crate::error::GenerateError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ChatService>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(chat: ChatService) -> Self {
        Self {
            chat: Arc::new(chat),
            start_time: Instant::now(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for GenerateError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
