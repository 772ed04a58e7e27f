use {
    crate::domain::error::LedgerError,
    axum::{
        Json,
        http::StatusCode,
        response::{IntoResponse, Response},
    },
};

/// Newtype over the domain error so the HTTP mapping lives in the adapter
/// layer.
pub struct ApiError(pub LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        Self(err)
    }
}

/// Failure detail goes to the log; callers get a category and a generic
/// message.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self.0 {
            LedgerError::Signature(err) => {
                tracing::warn!("webhook signature rejected: {err}");
                (
                    StatusCode::BAD_REQUEST,
                    "webhook_error",
                    "invalid webhook signature",
                )
            }
            LedgerError::Validation(err) => {
                tracing::warn!("invalid payload: {err}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "validation_error",
                    "invalid event payload",
                )
            }
            LedgerError::Database(err) => {
                tracing::error!("database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error",
                )
            }
            LedgerError::Serialization(err) => {
                tracing::error!("serialization error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error",
                )
            }
            LedgerError::Provider(err) => {
                tracing::error!("provider error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "provider_error",
                    "payment provider unavailable",
                )
            }
        };

        let body = serde_json::json!({
            "error_code": error_code,
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}
