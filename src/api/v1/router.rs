use super::error::*;
use super::handler::{self, Caller};
use super::method::{AuthRequirement, Method};
use crate::application_port::AuthService;
use std::convert::Infallible;
use std::sync::Arc;
use warp::filters::BoxedFilter;
use warp::{Filter, http, reject};

pub fn routes(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let login = endpoint(Method::Login, auth_service.clone())
        .and(warp::body::json())
        .and(with(auth_service.clone()))
        .and_then(handler::login);

    let refresh = endpoint(Method::Refresh, auth_service.clone())
        .and(warp::body::json())
        .and(with(auth_service.clone()))
        .and_then(handler::refresh);

    let logout = endpoint(Method::Logout, auth_service.clone())
        .and(with(auth_service.clone()))
        .and_then(handler::logout);

    let validate = endpoint(Method::Validate, auth_service.clone())
        .and(warp::body::json())
        .and(with(auth_service.clone()))
        .and_then(handler::validate);

    warp::path("auth").and(login.or(refresh).or(logout).or(validate))
}

/// `POST /<method>` guarded by the method's declared auth requirement.
fn endpoint(method: Method, auth_service: Arc<dyn AuthService>) -> BoxedFilter<(Caller,)> {
    warp::post()
        .and(warp::path(method.path()))
        .and(warp::path::end())
        .and(authorize(method.auth_requirement(), auth_service))
        .boxed()
}

fn authorize(
    requirement: AuthRequirement,
    auth_service: Arc<dyn AuthService>,
) -> BoxedFilter<(Caller,)> {
    match requirement {
        AuthRequirement::Public => warp::any().map(|| Caller::Anonymous).boxed(),
        AuthRequirement::AccessToken => with_verification(auth_service).boxed(),
    }
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_verification(
    auth_service: Arc<dyn AuthService>,
) -> impl Filter<Extract = (Caller,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>(http::header::AUTHORIZATION.as_str()).and_then(
        move |header: Option<String>| {
            let auth_service = auth_service.clone();
            async move {
                let Some(token) = header.as_deref().and_then(|h| h.strip_prefix("Bearer ")) else {
                    return Err(reject::custom(ApiErrorCode::InvalidToken));
                };
                let claims = auth_service
                    .validate_access_token(token)
                    .await
                    .map_err(ApiErrorCode::from)
                    .map_err(reject::custom)?;
                Ok(Caller::User(claims.sub))
            }
        },
    )
}
