use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use crate::logger::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let code = if let Some(code) = err.find::<ApiErrorCode>() {
        code.clone()
    } else if err.is_not_found() {
        ApiErrorCode::NotFound
    } else if err.find::<warp::body::BodyDeserializeError>().is_some()
        || err.find::<warp::reject::PayloadTooLarge>().is_some()
        || err.find::<warp::reject::LengthRequired>().is_some()
        || err.find::<warp::reject::UnsupportedMediaType>().is_some()
    {
        ApiErrorCode::BadRequest
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        ApiErrorCode::NotFound
    } else {
        ApiErrorCode::internal(format!("unhandled rejection: {:?}", err))
    };

    let json = warp::reply::json(&ApiResponse::<()>::err(code.clone(), code.to_string()));
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
pub enum ApiErrorCode {
    #[error("You are not logged in")]
    Unauthorized,
    #[error("Token has expired")]
    TokenExpired,
    #[error("No permission to access")]
    Forbidden,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Invalid email, username or password format")]
    InvalidInput,
    #[error("Email has been used")]
    EmailTaken,
    #[error("Username has been used")]
    UsernameTaken,
    #[error("Account not found")]
    AccountNotFound,
    #[error("Malformed request")]
    BadRequest,
    #[error("Router not found")]
    NotFound,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::Unauthorized | ApiErrorCode::TokenExpired => StatusCode::UNAUTHORIZED,
            ApiErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ApiErrorCode::InvalidCredentials
            | ApiErrorCode::InvalidInput
            | ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::EmailTaken | ApiErrorCode::UsernameTaken => StatusCode::CONFLICT,
            ApiErrorCode::AccountNotFound | ApiErrorCode::NotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Expired => {
                debug!("auth failure: {}", error);
                ApiErrorCode::TokenExpired
            }
            AuthError::Malformed
            | AuthError::SignatureInvalid
            | AuthError::Revoked
            | AuthError::MissingToken
            | AuthError::WrongTokenKind { .. } => {
                debug!("auth failure: {}", error);
                ApiErrorCode::Unauthorized
            }
            AuthError::Forbidden => ApiErrorCode::Forbidden,
            AuthError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            AuthError::InvalidInput(reason) => {
                debug!("invalid input: {}", reason);
                ApiErrorCode::InvalidInput
            }
            AuthError::EmailTaken => ApiErrorCode::EmailTaken,
            AuthError::UsernameTaken => ApiErrorCode::UsernameTaken,
            AuthError::AccountNotFound => ApiErrorCode::AccountNotFound,
            AuthError::Store(e) => ApiErrorCode::internal(e),
            AuthError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}
