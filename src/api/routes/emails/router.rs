//! Router for the emails API

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, post},
};

use super::db::{self as emails_db, ComposeOutcome};
use super::public;
use crate::api::extract::{AppJson, CurrentUser, parse_json_body};
use crate::api::public::ApiError;
use crate::api::routes::SharedState;

/// Send a new email to a comma separated list of recipients
async fn compose(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    AppJson(payload): AppJson<public::ComposeRequest>,
) -> Result<(StatusCode, Json<public::ComposeResponse>), ApiError> {
    let addresses = public::parse_recipients(&payload.recipients);
    if addresses.is_empty() {
        return Err(ApiError::bad_request("At least one recipient required."));
    }

    let db = state.read().expect("Unable to read share state").db.clone();
    let outcome =
        emails_db::send_email(&db, user.id, addresses, payload.subject, payload.body).await?;

    match outcome {
        ComposeOutcome::Sent { copies } => {
            tracing::info!("{} sent an email, {} copies stored", user.email, copies);
            Ok((
                StatusCode::CREATED,
                Json(public::ComposeResponse {
                    message: String::from("Email sent successfully."),
                }),
            ))
        }
        ComposeOutcome::UnknownRecipient(address) => Err(ApiError::BadRequest(format!(
            "User with email {} does not exist.",
            address
        ))),
    }
}

// Anything but POST on /emails
async fn compose_requires_post(_user: CurrentUser) -> ApiError {
    ApiError::bad_request("POST request required.")
}

/// `/emails/{key}` is either a numeric email id or a mailbox name
async fn email_or_mailbox(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    method: Method,
    Path(key): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let db = state.read().expect("Unable to read share state").db.clone();

    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        let mailbox: public::Mailbox = key
            .parse()
            .map_err(|_| ApiError::bad_request("Invalid mailbox."))?;
        let emails = emails_db::list_mailbox(&db, user.id, mailbox).await?;
        return Ok(Json(emails).into_response());
    }

    // Ids too large for an i64 can't exist
    let email_id: i64 = key
        .parse()
        .map_err(|_| ApiError::not_found("Email not found."))?;

    let Some(email) = emails_db::find_email(&db, user.id, email_id).await? else {
        return Err(ApiError::not_found("Email not found."));
    };

    match method {
        Method::GET => Ok(Json(email).into_response()),
        Method::PUT => {
            let update: public::UpdateEmailRequest = parse_json_body(&body)?;
            // Last write wins if the row was touched in between
            if !emails_db::update_email_flags(&db, user.id, email.id, update).await? {
                return Err(ApiError::not_found("Email not found."));
            }
            Ok(StatusCode::NO_CONTENT.into_response())
        }
        _ => Err(ApiError::bad_request("GET or PUT request required.")),
    }
}

/// Create the emails router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/emails", post(compose).fallback(compose_requires_post))
        .route("/emails/{key}", any(email_or_mailbox))
}
