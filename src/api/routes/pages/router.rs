//! Router for the HTML pages and session handling

use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use super::public;
use crate::api::extract::{CurrentUser, SESSION_COOKIE, removal_cookie, session_cookie};
use crate::api::public::ApiError;
use crate::api::routes::SharedState;
use crate::api::templates::{Page, render};
use crate::core::AppConfig;
use crate::core::auth;

fn shared_db_and_config(state: &SharedState) -> (tokio_rusqlite::Connection, AppConfig) {
    let shared_state = state.read().expect("Unable to read share state");
    (shared_state.db.clone(), shared_state.config.clone())
}

/// Signed in users get their inbox, everyone else is sent to log in
async fn index(
    State(state): State<SharedState>,
    user: Option<CurrentUser>,
) -> Result<Response, ApiError> {
    match user {
        Some(CurrentUser(user)) => {
            Ok(render(&state, Page::Inbox, &json!({ "email": user.email }))?.into_response())
        }
        None => Ok(Redirect::to("/login").into_response()),
    }
}

async fn login_page(State(state): State<SharedState>) -> Result<Response, ApiError> {
    Ok(render(&state, Page::Login, &json!({ "message": null }))?.into_response())
}

async fn login(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<public::LoginForm>,
) -> Result<Response, ApiError> {
    let (db, config) = shared_db_and_config(&state);

    // Same normalization as registration
    let email = form.email.trim();
    let Some(user) = auth::authenticate(&db, email, &form.password).await? else {
        let data = json!({ "message": "Invalid email and/or password." });
        return Ok(render(&state, Page::Login, &data)?.into_response());
    };

    let token = auth::create_session(&db, user.id, config.session_max_age_days).await?;
    tracing::info!("{} logged in", user.email);

    Ok((jar.add(session_cookie(token, &config)), Redirect::to("/")).into_response())
}

async fn logout(
    State(state): State<SharedState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), ApiError> {
    if let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned()) {
        let db = state.read().expect("Unable to read share state").db.clone();
        auth::delete_session(&db, &token).await?;
    }
    Ok((jar.remove(removal_cookie()), Redirect::to("/")))
}

async fn register_page(State(state): State<SharedState>) -> Result<Response, ApiError> {
    Ok(render(&state, Page::Register, &json!({ "message": null }))?.into_response())
}

async fn register(
    State(state): State<SharedState>,
    jar: CookieJar,
    Form(form): Form<public::RegisterForm>,
) -> Result<Response, ApiError> {
    let rerender = |message: &str| -> Result<Response, ApiError> {
        Ok(render(&state, Page::Register, &json!({ "message": message }))?.into_response())
    };

    let email = form.email.trim();
    if email.is_empty() {
        return rerender("Email address required.");
    }
    if form.password != form.confirmation {
        return rerender("Passwords must match.");
    }

    let (db, config) = shared_db_and_config(&state);
    let Some(user) = auth::create_user(&db, email, &form.password).await? else {
        return rerender("Email address already taken.");
    };
    tracing::info!("Registered new user {}", user.email);

    let token = auth::create_session(&db, user.id, config.session_max_age_days).await?;
    Ok((jar.add(session_cookie(token, &config)), Redirect::to("/")).into_response())
}

/// Create the pages router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(index))
        .route("/login", get(login_page).post(login))
        .route("/logout", get(logout))
        .route("/register", get(register_page).post(register))
}
