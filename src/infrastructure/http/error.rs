//! HTTP Error Handling
//!
//! 业务错误统一返回 HTTP 200，错误类型由 errno 区分。

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::StoryError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errno: i32,
    pub error: String,
    pub data: Option<()>,
}

impl ErrorResponse {
    pub fn new(errno: i32, error: impl Into<String>) -> Self {
        Self {
            errno,
            error: error.into(),
            data: None,
        }
    }
}

/// 错误码定义
pub mod errno {
    pub const BAD_REQUEST: i32 = 400;
    pub const UNPROCESSABLE: i32 = 422;
    pub const CLIENT_CLOSED: i32 = 499;
    pub const INTERNAL_ERROR: i32 = 500;
    pub const SERVICE_UNAVAILABLE: i32 = 503;
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// 后端有回复但无法解析
    Unprocessable(String),
    Cancelled(String),
    Internal(String),
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn errno(&self) -> i32 {
        match self {
            ApiError::BadRequest(_) => errno::BAD_REQUEST,
            ApiError::Unprocessable(_) => errno::UNPROCESSABLE,
            ApiError::Cancelled(_) => errno::CLIENT_CLOSED,
            ApiError::Internal(_) => errno::INTERNAL_ERROR,
            ApiError::ServiceUnavailable(_) => errno::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.errno();
        let msg = match self {
            ApiError::BadRequest(msg) => {
                tracing::warn!(errno = code, error = %msg, "Bad request");
                msg
            }
            ApiError::Unprocessable(msg) => {
                tracing::warn!(errno = code, error = %msg, "Unprocessable backend response");
                msg
            }
            ApiError::Cancelled(msg) => {
                tracing::info!(errno = code, error = %msg, "Request cancelled");
                msg
            }
            ApiError::Internal(msg) => {
                tracing::error!(errno = code, error = %msg, "Internal server error");
                msg
            }
            ApiError::ServiceUnavailable(msg) => {
                tracing::error!(errno = code, error = %msg, "Service unavailable");
                msg
            }
        };

        (StatusCode::OK, Json(ErrorResponse::new(code, msg))).into_response()
    }
}

impl From<StoryError> for ApiError {
    fn from(e: StoryError) -> Self {
        let msg = e.to_string();
        match e {
            StoryError::InvalidInput(_) => ApiError::BadRequest(msg),
            StoryError::Validation { .. } | StoryError::ScoreParse { .. } => {
                ApiError::Unprocessable(msg)
            }
            StoryError::Generation { .. } => ApiError::ServiceUnavailable(msg),
            StoryError::Cancelled { .. } => ApiError::Cancelled(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{GenerationError, Phase, Stage};
    use crate::domain::story::ScoreDimension;

    #[test]
    fn test_story_error_mapping() {
        let cases = [
            (StoryError::InvalidInput("blank".into()), errno::BAD_REQUEST),
            (
                StoryError::validation(Stage::plan(Phase::Outline), "empty"),
                errno::UNPROCESSABLE,
            ),
            (
                StoryError::ScoreParse {
                    stage: Stage::section(Phase::Scoring, 1),
                    dimension: ScoreDimension::Fluency,
                    response: String::new(),
                },
                errno::UNPROCESSABLE,
            ),
            (
                StoryError::generation(Stage::section(Phase::Rewrite, 0), GenerationError::Timeout),
                errno::SERVICE_UNAVAILABLE,
            ),
            (
                StoryError::Cancelled {
                    stage: Stage::plan(Phase::Setting),
                },
                errno::CLIENT_CLOSED,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).errno(), expected);
        }
    }

    #[test]
    fn test_error_response_is_http_200() {
        let response = ApiError::BadRequest("premise must not be empty".into()).into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
