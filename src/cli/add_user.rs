use crate::core::auth::create_user;
use crate::core::db::async_db;
use anyhow::{Context, Result, anyhow};

pub async fn run(email: &str, password: &str, db_path: &str) -> Result<()> {
    let db = async_db(db_path)
        .await
        .context("Failed to connect to db")?;

    match create_user(&db, email.trim(), password).await? {
        Some(user) => {
            println!("Created user {} with id {}", user.email, user.id);
            Ok(())
        }
        None => Err(anyhow!("Email address already taken: {}", email)),
    }
}
