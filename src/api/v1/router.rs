use super::session_cookie::{ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use super::error::*;
use super::handler::{self, SignInRequest, SignOutRequest, SignUpRequest};
use crate::application_impl::AuthPipeline;
use crate::domain_model::RequestContext;
use crate::server::Server;
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, reject};

const BODY_LIMIT: u64 = 16 * 1024;

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let sign_up = warp::post()
        .and(warp::path("users"))
        .and(warp::path("signup"))
        .and(warp::path::end())
        .and(json_body::<SignUpRequest>())
        .and(with(server.auth_service.clone()))
        .and_then(handler::sign_up);

    let sign_in = warp::post()
        .and(warp::path("users"))
        .and(warp::path("signin"))
        .and(warp::path::end())
        .and(json_body::<SignInRequest>())
        .and(with(server.auth_service.clone()))
        .and(with(server.cookies.clone()))
        .and_then(handler::sign_in);

    let refresh = warp::post()
        .and(warp::path("users"))
        .and(warp::path("refresh"))
        .and(warp::path::end())
        .and(warp::body::content_length_limit(BODY_LIMIT))
        .and(warp::body::bytes())
        .and(warp::cookie::optional(REFRESH_TOKEN_COOKIE))
        .and(with(server.auth_service.clone()))
        .and(with(server.cookies.clone()))
        .and_then(handler::refresh);

    let sign_out = warp::post()
        .and(warp::path("users"))
        .and(warp::path("signout"))
        .and(warp::path::end())
        .and(json_body::<SignOutRequest>())
        .and(with_session(server.pipeline.clone()))
        .and(with(server.auth_service.clone()))
        .and(with(server.cookies.clone()))
        .and_then(handler::sign_out);

    let profile = warp::get()
        .and(warp::path("users"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(with_session(server.pipeline.clone()))
        .and(with(server.auth_service.clone()))
        .and_then(handler::get_profile);

    sign_up.or(sign_in).or(refresh).or(sign_out).or(profile)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone {
    warp::body::content_length_limit(BODY_LIMIT).and(warp::body::json())
}

/// Access token from the session cookie, falling back to a bearer header.
fn with_session(
    pipeline: AuthPipeline,
) -> impl Filter<Extract = (RequestContext,), Error = warp::Rejection> + Clone {
    warp::cookie::optional(ACCESS_TOKEN_COOKIE)
        .and(warp::header::optional::<String>("authorization"))
        .and_then(move |cookie: Option<String>, header: Option<String>| {
            let pipeline = pipeline.clone();
            async move {
                let bearer = header.and_then(|h| h.strip_prefix("Bearer ").map(str::to_owned));
                // A cleared cookie arrives as an empty value.
                let token = cookie.filter(|c| !c.is_empty()).or(bearer);
                pipeline
                    .authenticate(token.as_deref())
                    .await
                    .map_err(ApiErrorCode::from)
                    .map_err(reject::custom)
            }
        })
}
