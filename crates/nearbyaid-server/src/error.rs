use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use nearbyaid_shared::protocol::ErrorBody;
use nearbyaid_shared::ValidationError;
use nearbyaid_store::StoreError;
use thiserror::Error;

use crate::config::Environment;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Not authorized - {0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Route not found: {0}")]
    NotFound(String),

    /// Storage failure. `context` is shown to the caller, `detail` only in
    /// development mode.
    #[error("{context}: {detail}")]
    Storage {
        context: &'static str,
        detail: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Map a store failure, keeping validation and conflict errors on the
    /// client side of the 4xx/5xx line.
    pub fn from_store(context: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::Validation(v) => ServerError::Validation(v),
            StoreError::UnknownPublisher => {
                ServerError::Unauthorized("account no longer exists".to_string())
            }
            StoreError::DuplicateEmail => {
                ServerError::Conflict("Email already registered".to_string())
            }
            other => ServerError::Storage {
                context,
                detail: other.to_string(),
            },
        }
    }
}

/// Internal detail of a 500 response, attached as a response extension and
/// rendered into the body by [`error_detail_middleware`] in development mode.
#[derive(Debug, Clone)]
pub struct ErrorDetail {
    message: String,
    detail: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message, field) = match &self {
            ServerError::Validation(v) => {
                (StatusCode::BAD_REQUEST, self.to_string(), Some(v.field))
            }
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string(), None),
            ServerError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.to_string(), None),
            ServerError::Conflict(_) => (StatusCode::CONFLICT, self.to_string(), None),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string(), None),
            ServerError::Storage { context, .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, context.to_string(), None)
            }
            ServerError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong on the server".to_string(),
                None,
            ),
        };

        let body = ErrorBody {
            success: false,
            message: message.clone(),
            field: field.map(str::to_string),
            error: None,
        };
        let mut response = (status, Json(body)).into_response();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            response.extensions_mut().insert(ErrorDetail {
                message,
                detail: self.to_string(),
            });
        }

        response
    }
}

/// Adds the internal error text to 500 bodies when running in development
/// mode, and strips the detail extension otherwise.
pub async fn error_detail_middleware(
    State(environment): State<Environment>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let mut response = next.run(req).await;

    let Some(detail) = response.extensions_mut().remove::<ErrorDetail>() else {
        return response;
    };
    if !environment.exposes_error_detail() {
        return response;
    }

    let body = ErrorBody {
        success: false,
        message: detail.message,
        field: None,
        error: Some(detail.detail),
    };
    (response.status(), Json(body)).into_response()
}
