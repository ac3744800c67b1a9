//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use validator::ValidationErrors;

use crate::application::CheckoutError;
use crate::domain::aggregates::CartError;
use crate::domain::value_objects::MoneyError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Catalog is still loading")]
    CatalogLoading,

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Pricing error: {0}")]
    Pricing(#[from] MoneyError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) | Self::Cart(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::EmptyCart | Self::Checkout(CheckoutError::InProgress) => StatusCode::CONFLICT,
            Self::CatalogLoading => StatusCode::SERVICE_UNAVAILABLE,
            Self::Pricing(_) | Self::Checkout(CheckoutError::Pricing(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::CatalogUnavailable(_) | Self::Checkout(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let retryable = match &self {
            Self::Checkout(e) => e.is_retryable(),
            Self::CatalogLoading => true,
            _ => false,
        };
        if matches!(self, Self::Checkout(_) | Self::CatalogUnavailable(_) | Self::Pricing(_)) {
            tracing::error!(error = %self, "Request error");
        }
        (self.status(), Json(serde_json::json!({ "error": self.to_string(), "retryable": retryable }))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
