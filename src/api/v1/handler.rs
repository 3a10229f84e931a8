use super::session_cookie::CookiePolicy;
use super::error::*;
use crate::application_impl::authorize;
use crate::application_port::*;
use crate::domain_model::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::header::SET_COOKIE;
use warp::http::{HeaderValue, StatusCode};
use warp::hyper::body::Bytes;
use warp::{self, Reply, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

fn with_cookies<R: Reply>(reply: R, cookies: [String; 2]) -> Result<warp::reply::Response, warp::Rejection> {
    let mut response = reply.into_response();
    for c in cookies {
        let value = HeaderValue::from_str(&c)
            .map_err(ApiErrorCode::internal)
            .map_err(reject::custom)?;
        response.headers_mut().append(SET_COOKIE, value);
    }
    Ok(response)
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

pub async fn sign_up(
    body: SignUpRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = SignUpInput {
        email: body.email,
        username: body.username,
        password: body.password,
    };
    let profile = auth_service
        .sign_up(input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::with_status(
        warp::reply::json(&ApiResponse::ok(profile)),
        StatusCode::CREATED,
    ))
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

pub async fn sign_in(
    body: SignInRequest,
    auth_service: Arc<dyn AuthService>,
    cookies: Arc<CookiePolicy>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let input = SignInInput {
        email: body.email,
        password: body.password,
    };
    let passport = auth_service
        .sign_in(input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let set = cookies.session_cookies(
        &passport.token.access_token.0,
        &passport.token.refresh_token.0,
    );
    with_cookies(warp::reply::json(&ApiResponse::ok(passport)), set)
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh token from the JSON body, else from the refresh cookie.
pub async fn refresh(
    body: Bytes,
    cookie_token: Option<String>,
    auth_service: Arc<dyn AuthService>,
    cookies: Arc<CookiePolicy>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let token = if body.iter().all(u8::is_ascii_whitespace) {
        cookie_token
    } else {
        let req: RefreshRequest = serde_json::from_slice(&body)
            .map_err(|_| reject::custom(ApiErrorCode::BadRequest))?;
        Some(req.refresh_token)
    };
    let token = token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| reject::custom(ApiErrorCode::from(AuthError::MissingToken)))?;

    let passport = auth_service
        .refresh(&token)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let set = cookies.session_cookies(
        &passport.token.access_token.0,
        &passport.token.refresh_token.0,
    );
    with_cookies(warp::reply::json(&ApiResponse::ok(passport)), set)
}

#[derive(Debug, Deserialize)]
pub struct SignOutRequest {
    pub external_account_id: ExternalAccountId,
}

#[derive(Debug, Serialize)]
pub struct SignOutResponse {
    pub external_account_id: ExternalAccountId,
    pub deleted: bool,
}

pub async fn sign_out(
    body: SignOutRequest,
    ctx: RequestContext,
    auth_service: Arc<dyn AuthService>,
    cookies: Arc<CookiePolicy>,
) -> Result<impl warp::Reply, warp::Rejection> {
    auth_service
        .sign_out(&ctx, &body.external_account_id)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let ack = SignOutResponse {
        external_account_id: body.external_account_id,
        deleted: true,
    };
    with_cookies(warp::reply::json(&ApiResponse::ok(ack)), cookies.cleared_cookies())
}

pub async fn get_profile(
    user_id: String,
    ctx: RequestContext,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let owner = AccountId(user_id.trim().to_string());
    authorize(Some(&ctx), &owner)
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let profile = auth_service
        .profile(&owner)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(profile)))
}
