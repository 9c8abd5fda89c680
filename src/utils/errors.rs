//! Sistema de manejo de errores
//!
//! Este módulo define los errores del gateway de analytics y su conversión
//! a respuestas HTTP. Los casos de "datos insuficientes" y las anomalías de
//! odómetro NO son errores: viajan dentro del `ConsumptionReport`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    code: String,
}

impl AppError {
    /// Código máquina estable para el cliente
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ExternalApi(_) | AppError::Http(_) => "EXTERNAL_API_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ExternalApi(_) | AppError::Http(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code().to_string();

        let error_response = match &self {
            AppError::InvalidInput(msg) => {
                warn!("Invalid input: {}", msg);
                ErrorResponse {
                    error: "Invalid Input".to_string(),
                    message: msg.clone(),
                    details: None,
                    code,
                }
            }

            AppError::Validation(e) => {
                warn!("Validation error: {}", e);
                ErrorResponse {
                    error: "Validation Error".to_string(),
                    message: "The provided data is invalid".to_string(),
                    details: Some(json!(e)),
                    code,
                }
            }

            AppError::Unauthorized(msg) => {
                warn!("Unauthorized access: {}", msg);
                ErrorResponse {
                    error: "Unauthorized".to_string(),
                    message: msg.clone(),
                    details: None,
                    code,
                }
            }

            AppError::Forbidden(msg) => {
                warn!("Forbidden access: {}", msg);
                ErrorResponse {
                    error: "Forbidden".to_string(),
                    message: msg.clone(),
                    details: None,
                    code,
                }
            }

            AppError::NotFound(msg) => {
                warn!("Resource not found: {}", msg);
                ErrorResponse {
                    error: "Not Found".to_string(),
                    message: msg.clone(),
                    details: None,
                    code,
                }
            }

            AppError::ExternalApi(msg) => {
                error!("External API error: {}", msg);
                ErrorResponse {
                    error: "External API Error".to_string(),
                    message: "An error occurred while communicating with the fuel tracker backend".to_string(),
                    details: Some(json!({ "external_api_error": msg })),
                    code,
                }
            }

            AppError::Http(e) => {
                error!("HTTP client error: {}", e);
                ErrorResponse {
                    error: "External API Error".to_string(),
                    message: "The fuel tracker backend could not be reached".to_string(),
                    details: Some(json!({ "http_error": e.to_string() })),
                    code,
                }
            }

            AppError::Config(msg) => {
                error!("Configuration error: {}", msg);
                ErrorResponse {
                    error: "Configuration Error".to_string(),
                    message: "The service is misconfigured".to_string(),
                    details: None,
                    code,
                }
            }

            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                ErrorResponse {
                    error: "Internal Server Error".to_string(),
                    message: "An unexpected error occurred".to_string(),
                    details: Some(json!({ "internal_error": msg })),
                    code,
                }
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación sobre un campo concreto
pub fn validation_error(field: &'static str, message: &'static str) -> AppError {
    use validator::ValidationError;

    let mut error = ValidationError::new("custom");
    error.add_param("field".into(), &field);
    error.add_param("message".into(), &message);

    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);

    AppError::Validation(errors)
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de entrada inválida
pub fn invalid_input_error(message: impl Into<String>) -> AppError {
    AppError::InvalidInput(message.into())
}
