use adventurer_engine::{Progress, TraversalState};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StateView {
    pub state: TraversalState,
    pub progress: Progress,
    pub busy: bool,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("a step is already in progress")]
    Busy,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Busy => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            success: false,
            data: None,
            message: Some(self.to_string()),
        };
        (self.status(), Json(body)).into_response()
    }
}
