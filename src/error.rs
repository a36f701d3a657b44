use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// `{success, data|error}` envelope returned by every JSON handler.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data: Some(data),
        error: None,
    })
}

/// Errors raised at the request boundary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    /// Anything the client should only see as a generic message.
    #[error("{public}")]
    Internal {
        public: &'static str,
        cause: anyhow::Error,
    },
}

impl AppError {
    pub fn internal(public: &'static str, cause: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            public,
            cause: cause.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal { public, cause } => {
                tracing::error!(error = %format!("{cause:#}"), "{public}");
                (StatusCode::INTERNAL_SERVER_ERROR, public.to_string())
            }
        };

        let body: ApiResponse<()> = ApiResponse {
            success: false,
            data: None,
            error: Some(message),
        };
        (status, Json(body)).into_response()
    }
}

/// Failures talking to a third-party HTTP API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0} credentials are not configured")]
    MissingCredentials(&'static str),

    #[error("request to {service} failed: {source}")]
    Request {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{service} returned an unexpected payload: {detail}")]
    Malformed {
        service: &'static str,
        detail: String,
    },
}

impl UpstreamError {
    pub fn request(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self::Request { service, source }
    }

    pub fn status(service: &'static str, status: reqwest::StatusCode, body: &str) -> Self {
        Self::Status {
            service,
            status,
            body: body.chars().take(200).collect(),
        }
    }

    pub fn malformed(service: &'static str, detail: impl ToString) -> Self {
        Self::Malformed {
            service,
            detail: detail.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(res: Response) -> serde_json::Value {
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn internal_error_hides_cause() {
        let res = AppError::internal("Failed to generate meal plan", anyhow::anyhow!("db down"))
            .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(res).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Failed to generate meal plan");
        assert!(!json.to_string().contains("db down"));
    }

    #[tokio::test]
    async fn client_errors_keep_message() {
        let res = AppError::BadRequest("query is required".into()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["error"], "query is required");
    }

    #[test]
    fn success_envelope_omits_error() {
        let json = serde_json::to_value(&ok(vec![1, 2]).0).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": [1, 2]}));
    }

    #[test]
    fn status_error_truncates_body() {
        let long = "x".repeat(500);
        let err = UpstreamError::status("Spoonacular", reqwest::StatusCode::BAD_GATEWAY, &long);
        match err {
            UpstreamError::Status { body, .. } => assert_eq!(body.len(), 200),
            other => panic!("unexpected {other:?}"),
        }
    }
}
