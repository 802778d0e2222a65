use std::env;

pub const DEFAULT_SESSION_MAX_AGE_DAYS: i64 = 14;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    // Served as the fallback route. The inbox page expects the client
    // script at `{static_path}/mail/inbox.js` and its stylesheet at
    // `{static_path}/mail/styles.css`.
    pub static_path: String,
    pub secure_cookies: bool,
    // Sessions older than this stop authenticating
    pub session_max_age_days: i64,
}

impl AppConfig {
    /// Build a config rooted at `storage_path` with everything else
    /// left at its default.
    pub fn with_storage_path(storage_path: &str) -> Self {
        let db_path = format!("{}/db", storage_path);
        Self {
            storage_path: storage_path.to_string(),
            db_path,
            static_path: String::from("./static"),
            secure_cookies: false,
            session_max_age_days: DEFAULT_SESSION_MAX_AGE_DAYS,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let storage_path = env::var("MAIL_STORAGE_PATH").unwrap_or("./".to_string());
        let static_path = env::var("MAIL_STATIC_PATH").unwrap_or("./static".to_string());
        let secure_cookies = env::var("MAIL_SECURE_COOKIES")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);
        let session_max_age_days = env::var("MAIL_SESSION_MAX_AGE_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SESSION_MAX_AGE_DAYS);

        Self {
            static_path,
            secure_cookies,
            session_max_age_days,
            ..Self::with_storage_path(&storage_path)
        }
    }
}
