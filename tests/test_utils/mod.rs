//! Test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::sync::{Arc, RwLock};

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use tempfile::TempDir;
use tokio_rusqlite::{Connection, params};
use tower::util::ServiceExt;

use mail::api::{AppState, SESSION_COOKIE, app};
use mail::core::AppConfig;
use mail::core::config::DEFAULT_SESSION_MAX_AGE_DAYS;
use mail::core::auth::{User, create_session, create_user};
use mail::core::db::{async_db, initialize_db};

pub const TEST_PASSWORD: &str = "password123";

/// A router backed by its own database in a temporary directory.
/// The directory lives as long as this struct.
pub struct TestApp {
    pub router: Router,
    pub db: Connection,
    _dir: TempDir,
}

pub async fn test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = AppConfig {
        static_path: format!("{}/static", env!("CARGO_MANIFEST_DIR")),
        ..AppConfig::with_storage_path(dir.path().to_str().unwrap())
    };
    fs::create_dir_all(&config.db_path).expect("Failed to create db directory");

    let db = async_db(&config.db_path)
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn).expect("Failed to migrate db");
        Ok(())
    })
    .await
    .unwrap();

    let app_state = AppState::new(db.clone(), config);
    TestApp {
        router: app(Arc::new(RwLock::new(app_state))),
        db,
        _dir: dir,
    }
}

impl TestApp {
    pub async fn create_user(&self, email: &str) -> User {
        create_user(&self.db, email, TEST_PASSWORD)
            .await
            .unwrap()
            .expect("User already exists")
    }

    /// Value for a `cookie` header that authenticates as `user`
    pub async fn login(&self, user: &User) -> String {
        let token = create_session(&self.db, user.id, DEFAULT_SESSION_MAX_AGE_DAYS)
            .await
            .unwrap();
        format!("{}={}", SESSION_COOKIE, token)
    }

    /// Move the session behind `cookie` back by `days`
    pub async fn age_session(&self, cookie: &str, days: i64) {
        let token = cookie
            .strip_prefix(&format!("{}=", SESSION_COOKIE))
            .expect("Not a session cookie")
            .to_string();
        let modifier = format!("-{} days", days);
        let updated = self
            .db
            .call(move |conn| {
                let updated = conn.execute(
                    r"
                    UPDATE session
                    SET created_at = strftime('%Y-%m-%d %H:%M:%f', created_at, ?2)
                    WHERE token = ?1
                    ",
                    params![token, modifier],
                )?;
                Ok(updated)
            })
            .await
            .unwrap();
        assert_eq!(updated, 1);
    }

    pub async fn session_count(&self) -> i64 {
        self.db
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM session", [], |row| row.get(0))?;
                Ok(count)
            })
            .await
            .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get_json(&self, uri: &str, cookie: Option<&str>) -> serde_json::Value {
        body_to_json(self.get(uri, cookie).await.into_body()).await
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn send_json(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: serde_json::Value,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .uri(uri)
            .method(method)
            .header("content-type", "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header("cookie", cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    pub async fn post_form(&self, uri: &str, body: &str) -> Response<Body> {
        let request = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Insert an email row directly, bypassing compose.
    pub async fn insert_email(
        &self,
        owner: &User,
        sender: &User,
        recipients: &[&User],
        subject: &str,
        timestamp: &str,
        read: bool,
        archived: bool,
    ) -> i64 {
        let (owner_id, sender_id) = (owner.id, sender.id);
        let recipient_ids: Vec<i64> = recipients.iter().map(|u| u.id).collect();
        let subject = subject.to_string();
        let timestamp = timestamp.to_string();
        self.db
            .call(move |conn| {
                conn.execute(
                    r"
                    INSERT INTO email (user_id, sender_id, subject, body, timestamp, read, archived)
                    VALUES (?1, ?2, ?3, '', ?4, ?5, ?6)
                    ",
                    params![owner_id, sender_id, subject, timestamp, read, archived],
                )?;
                let email_id = conn.last_insert_rowid();
                for recipient_id in recipient_ids {
                    conn.execute(
                        "INSERT INTO email_recipient (email_id, user_id) VALUES (?1, ?2)",
                        params![email_id, recipient_id],
                    )?;
                }
                Ok(email_id)
            })
            .await
            .unwrap()
    }

    pub async fn email_count(&self) -> i64 {
        self.db
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM email", [], |row| row.get(0))?;
                Ok(count)
            })
            .await
            .unwrap()
    }

    /// (owner email, read, archived) for every row with this subject
    pub async fn copies_of(&self, subject: &str) -> Vec<(String, bool, bool)> {
        let subject = subject.to_string();
        self.db
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r"
                    SELECT u.email, e.read, e.archived
                    FROM email e JOIN user_account u ON u.id = e.user_id
                    WHERE e.subject = ?1
                    ORDER BY u.email
                    ",
                )?;
                let rows = stmt
                    .query_map([subject], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
                    .collect::<rusqlite::Result<Vec<(String, bool, bool)>>>()?;
                Ok(rows)
            })
            .await
            .unwrap()
    }
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).unwrap()
}
