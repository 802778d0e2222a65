//! Request extractors shared by the routes

use axum::extract::{FromRequest, FromRequestParts, OptionalFromRequestParts, Request};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use http::request::Parts;
use serde::de::DeserializeOwned;

use crate::api::public::ApiError;
use crate::api::routes::SharedState;
use crate::core::AppConfig;
use crate::core::auth::{User, find_user_by_session};

pub const SESSION_COOKIE: &str = "mail_session";

/// Session cookie that the browser drops when the server side session
/// expires.
pub fn session_cookie(token: String, config: &AppConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure_cookies)
        .max_age(time::Duration::days(config.session_max_age_days))
        .build()
}

/// Cookie that overwrites the session cookie so the browser drops it.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE).path("/").build()
}

/// The user owning the session cookie on the request. Rejects with
/// 403 when there is no valid session. Use `Option<CurrentUser>` for
/// routes that also serve anonymous visitors.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<SharedState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        <Self as OptionalFromRequestParts<SharedState>>::from_request_parts(parts, state)
            .await?
            .ok_or(ApiError::Unauthenticated)
    }
}

impl OptionalFromRequestParts<SharedState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Option<Self>, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) else {
            return Ok(None);
        };

        let (db, max_age_days) = {
            let shared_state = state.read().expect("Unable to read share state");
            (
                shared_state.db.clone(),
                shared_state.config.session_max_age_days,
            )
        };
        let user = find_user_by_session(&db, &token, max_age_days).await?;
        Ok(user.map(CurrentUser))
    }
}

/// JSON body extractor that rejects with a JSON 400 instead of axum's
/// plain text 422.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::BadRequest(format!(
                "Invalid request body: {}",
                rejection.body_text()
            ))),
        }
    }
}

/// Parse a raw JSON body for handlers that only need one for some
/// methods.
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))
}
