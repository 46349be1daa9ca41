use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::assistant::AssistantError;
use crate::billing::BillingError;
use crate::forecast::ForecastError;
use crate::household::HouseholdError;

/// API error types that can be returned from handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {message}")]
    ValidationError { message: String, details: Vec<String> },

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Upstream error: {message}")]
    UpstreamError { message: String, raw: Option<String> },
}

/// Error response that gets serialized to JSON
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            details: Vec::new(),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::UpstreamError { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NotFound",
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::ValidationError { .. } => "ValidationError",
            ApiError::InternalError(_) => "InternalServerError",
            ApiError::ServiceUnavailable(_) => "ServiceUnavailable",
            ApiError::UpstreamError { .. } => "UpstreamError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.error_type();

        let (message, details) = match self {
            ApiError::InternalError(ref e) => {
                tracing::error!(error = %e, "API error occurred");
                ("An internal error occurred".to_string(), None)
            }
            ApiError::ServiceUnavailable(message) => {
                tracing::warn!(%message, "Service unavailable");
                (message, None)
            }
            ApiError::UpstreamError { message, raw } => {
                tracing::warn!(%message, "Upstream error");
                (message, raw.map(serde_json::Value::String))
            }
            ApiError::ValidationError { message, details } => {
                tracing::debug!(%message, "Validation failed");
                let details = (!details.is_empty()).then(|| serde_json::json!(details));
                (message, details)
            }
            other => {
                tracing::debug!(error = %other, "Client error");
                (other.to_string(), None)
            }
        };

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(error_response)).into_response()
    }
}

impl From<BillingError> for ApiError {
    fn from(error: BillingError) -> Self {
        match error {
            BillingError::UnknownCountry(_) => ApiError::BadRequest(error.to_string()),
            BillingError::InvalidTariff(details) => ApiError::ValidationError {
                message: "Invalid tariff".to_string(),
                details,
            },
            other => ApiError::validation(other.to_string()),
        }
    }
}

impl From<HouseholdError> for ApiError {
    fn from(error: HouseholdError) -> Self {
        match error {
            HouseholdError::DeviceNotFound(_) => ApiError::NotFound(error.to_string()),
            HouseholdError::UnknownDeviceType(_) | HouseholdError::UnknownCountry(_) => {
                ApiError::BadRequest(error.to_string())
            }
            HouseholdError::InvalidDevice(details) => ApiError::ValidationError {
                message: "Invalid device".to_string(),
                details,
            },
            other => ApiError::validation(other.to_string()),
        }
    }
}

impl From<ForecastError> for ApiError {
    fn from(error: ForecastError) -> Self {
        match error {
            ForecastError::Billing(e) => e.into(),
            ForecastError::InvalidBaseline(_) => ApiError::validation(error.to_string()),
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<AssistantError> for ApiError {
    fn from(error: AssistantError) -> Self {
        match error {
            AssistantError::NotConfigured => ApiError::ServiceUnavailable(error.to_string()),
            AssistantError::UnparsablePrediction { raw } => ApiError::UpstreamError {
                message: "Could not parse prediction data".to_string(),
                raw: Some(raw),
            },
            AssistantError::Prompt(e) => ApiError::InternalError(e.to_string()),
            other => ApiError::UpstreamError {
                message: other.to_string(),
                raw: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            ApiError::NotFound("test".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::validation("test").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::InternalError("test".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_domain_conversions() {
        let id = Uuid::new_v4();
        assert_eq!(
            ApiError::from(HouseholdError::DeviceNotFound(id)).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(BillingError::UnknownCountry("Mars".to_string())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(ForecastError::Billing(BillingError::NegativeEnergy(-1.0))).error_type(),
            "ValidationError"
        );
        assert_eq!(
            ApiError::from(AssistantError::NotConfigured).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(AssistantError::UnparsablePrediction { raw: "x".to_string() }).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_error_display() {
        let error = ApiError::NotFound("Device 123".to_string());
        assert_eq!(error.to_string(), "Resource not found: Device 123");
    }
}
