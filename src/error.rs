use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Failures a handler cannot turn into a page of its own. Backend errors
/// are handled in place and shown as localized messages instead.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found")]
    NotFound,

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "페이지를 찾을 수 없습니다."),
            AppError::Template(e) => {
                tracing::error!("Template render error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, message).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Fallback for paths no router claims.
pub async fn not_found() -> AppError {
    AppError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn not_found_returns_404() {
        assert_eq!(response_status(AppError::NotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn template_failure_returns_500() {
        let err = AppError::Template(askama::Error::Fmt(std::fmt::Error));
        assert_eq!(response_status(err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
