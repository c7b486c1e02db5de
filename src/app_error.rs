use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    api::GatewayError,
    auth::JwtError,
    params::FieldErrors,
    repositories::StoreError,
    services::{AccountError, CatalogError, OrderError, PaymentError},
};

/// Standard envelope for every JSON body the API returns.
#[derive(Serialize, ToSchema)]
pub struct StdResponse<T, M> {
    pub data: Option<T>,
    pub message: Option<M>,
}

impl<T: Serialize, M: Serialize> IntoResponse for StdResponse<T, M> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid request")]
    Validation(FieldErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    ForbiddenResource(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0} is unreachable")]
    ServiceUnreachable(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::ForbiddenResource(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnreachable(_) | AppError::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::Validation(errors) => ErrorBody {
                message: "invalid request".into(),
                errors: Some(errors),
            },
            AppError::ServiceUnreachable(service) => {
                tracing::error!(service = %service, "Upstream service unreachable");
                ErrorBody {
                    message: "something went wrong".into(),
                    errors: None,
                }
            }
            AppError::Other(err) => {
                tracing::error!(error = ?err, "Internal server error");
                ErrorBody {
                    message: "something went wrong".into(),
                    errors: None,
                }
            }
            other => ErrorBody {
                message: other.to_string(),
                errors: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AppError::NotFound("record not found".into()),
            StoreError::UniqueViolation(_) => AppError::Conflict("record already exists".into()),
            StoreError::MissingReference(_) => AppError::BadRequest("unknown reference".into()),
            err => AppError::Other(anyhow::Error::new(err)),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Unreachable(service) => AppError::ServiceUnreachable(service),
            GatewayError::Rejected { status, body } => AppError::Other(anyhow::anyhow!(
                "payment provider rejected order creation ({status}): {body}"
            )),
            GatewayError::Other(err) => AppError::Other(err),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Validation(errors) => AppError::Validation(errors),
            PaymentError::InvalidSignature => AppError::BadRequest(err.to_string()),
            PaymentError::NotFound(_) => AppError::NotFound(err.to_string()),
            PaymentError::Gateway(err) => err.into(),
            PaymentError::Store(err) => err.into(),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::Validation(errors) => AppError::Validation(errors),
            OrderError::DuplicateOrder => AppError::Conflict(err.to_string()),
            OrderError::UnknownReference => AppError::BadRequest(err.to_string()),
            OrderError::NotFound => AppError::NotFound("invalid order id".into()),
            OrderError::Payment(err) => err.into(),
            OrderError::Store(err) => err.into(),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Validation(errors) => AppError::Validation(errors),
            CatalogError::NotFound(_) => AppError::NotFound(err.to_string()),
            CatalogError::UnknownReference => AppError::BadRequest(err.to_string()),
            CatalogError::Store(err) => err.into(),
        }
    }
}

impl From<JwtError> for AppError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired | JwtError::Invalid | JwtError::WrongType => {
                AppError::Unauthorized(err.to_string())
            }
            JwtError::Signing(err) => AppError::Other(anyhow::Error::new(err)),
        }
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Validation(errors) => AppError::Validation(errors),
            AccountError::DuplicateEmail(_) => AppError::Conflict(err.to_string()),
            AccountError::UnknownEmail(_) => AppError::NotFound(err.to_string()),
            AccountError::InvalidCredentials => AppError::Unauthorized(err.to_string()),
            AccountError::Token(err) => err.into(),
            AccountError::Store(err) => err.into(),
            AccountError::Other(err) => AppError::Other(err),
        }
    }
}
