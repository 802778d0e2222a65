//! User accounts, password hashing and cookie sessions.

use anyhow::{Error, Result, anyhow};
use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use rusqlite::{ErrorCode, OptionalExtension};
use serde::Serialize;
use tokio_rusqlite::{Connection, params};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::error!("Stored password hash is malformed: {}", e);
            false
        }
    }
}

/// Create an account whose username is its email address. Returns
/// `None` when the email is already taken.
pub async fn create_user(db: &Connection, email: &str, password: &str) -> Result<Option<User>> {
    let password = password.to_owned();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password)).await??;
    let email = email.to_owned();

    let user = db
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO user_account (username, email, password_hash) VALUES (?1, ?2, ?3)",
                params![&email, &email, &password_hash],
            );
            match inserted {
                Ok(_) => Ok(Some(User {
                    id: conn.last_insert_rowid(),
                    username: email.clone(),
                    email,
                })),
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == ErrorCode::ConstraintViolation =>
                {
                    Ok(None)
                }
                Err(e) => Err(e.into()),
            }
        })
        .await?;

    Ok(user)
}

/// Check credentials, returning the user when the password matches.
pub async fn authenticate(db: &Connection, email: &str, password: &str) -> Result<Option<User>> {
    let email = email.to_owned();
    let found = db
        .call(move |conn| {
            let row = conn
                .query_row(
                    "SELECT id, username, email, password_hash FROM user_account WHERE username = ?1",
                    [&email],
                    |row| {
                        Ok((
                            User {
                                id: row.get(0)?,
                                username: row.get(1)?,
                                email: row.get(2)?,
                            },
                            row.get::<_, String>(3)?,
                        ))
                    },
                )
                .optional()?;
            Ok(row)
        })
        .await?;

    let Some((user, password_hash)) = found else {
        return Ok(None);
    };

    let password = password.to_owned();
    let valid =
        tokio::task::spawn_blocking(move || verify_password(&password, &password_hash)).await?;

    Ok(valid.then_some(user))
}

// SQLite modifier for `strftime` that yields the oldest still valid
// `session.created_at`.
fn session_cutoff(max_age_days: i64) -> String {
    format!("-{} days", max_age_days)
}

/// Start a new session for the user and return its token. Sessions
/// older than `max_age_days` are pruned on the way.
pub async fn create_session(db: &Connection, user_id: i64, max_age_days: i64) -> Result<String> {
    let token = uuid::Uuid::new_v4().simple().to_string();
    let t = token.clone();
    let cutoff = session_cutoff(max_age_days);
    db.call(move |conn| {
        let tx = conn.transaction()?;
        let expired = tx.execute(
            "DELETE FROM session WHERE created_at <= strftime('%Y-%m-%d %H:%M:%f', 'now', ?1)",
            [cutoff],
        )?;
        if expired > 0 {
            tracing::debug!("Pruned {} expired sessions", expired);
        }
        tx.execute(
            "INSERT INTO session (token, user_id) VALUES (?1, ?2)",
            params![t, user_id],
        )?;
        tx.commit()?;
        Ok(())
    })
    .await?;
    Ok(token)
}

/// Look up the user behind a session token. Tokens older than
/// `max_age_days` no longer match.
pub async fn find_user_by_session(
    db: &Connection,
    token: &str,
    max_age_days: i64,
) -> Result<Option<User>> {
    let token = token.to_owned();
    let cutoff = session_cutoff(max_age_days);
    let user = db
        .call(move |conn| {
            let user = conn
                .query_row(
                    r"
                    SELECT u.id, u.username, u.email
                    FROM session s
                    JOIN user_account u ON u.id = s.user_id
                    WHERE s.token = ?1
                      AND s.created_at > strftime('%Y-%m-%d %H:%M:%f', 'now', ?2)
                    ",
                    params![token, cutoff],
                    |row| {
                        Ok(User {
                            id: row.get(0)?,
                            username: row.get(1)?,
                            email: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            Ok(user)
        })
        .await?;
    Ok(user)
}

pub async fn delete_session(db: &Connection, token: &str) -> Result<()> {
    let token = token.to_owned();
    db.call(move |conn| {
        conn.execute("DELETE FROM session WHERE token = ?1", [token])?;
        Ok(())
    })
    .await?;
    Ok(())
}
