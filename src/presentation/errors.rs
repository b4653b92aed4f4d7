// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::domain::repositories::RepositoryError;
use crate::domain::services::notification_service::NotificationError;
use crate::domain::services::scan_service::ScanError;

/// 请求参数错误
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("{0}")]
    BadRequest(String),
}

/// 应用错误类型
///
/// 封装所有可能的应用层错误，按具体错误类型映射HTTP状态码
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        if let Some(err) = self.0.downcast_ref::<ScanError>() {
            return match err {
                ScanError::TargetNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                ScanError::Repository(inner) => {
                    error!("Scan aborted by persistence failure: {}", inner);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Scan failed: persistence error".to_string(),
                    )
                }
            };
        }

        if let Some(err) = self.0.downcast_ref::<RepositoryError>() {
            return match err {
                RepositoryError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
                RepositoryError::Database(db_err) => {
                    error!("Database error: {}", db_err);
                    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                }
            };
        }

        if let Some(err) = self.0.downcast_ref::<NotificationError>() {
            let status = match err {
                NotificationError::NotConfigured(_)
                | NotificationError::Status { .. }
                | NotificationError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            return (status, err.to_string());
        }

        if self.0.downcast_ref::<ValidationErrors>().is_some()
            || self.0.downcast_ref::<RequestError>().is_some()
        {
            return (StatusCode::BAD_REQUEST, self.0.to_string());
        }

        error!("Unhandled error: {:#}", self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, self.0.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
