use crate::core::db::{async_db, initialize_db};
use anyhow::{Context, Result, anyhow};
use std::fs;

pub async fn run(db: bool, db_path: &str) -> Result<()> {
    if !db {
        return Err(anyhow!("Missing value for init \"--db\""));
    }

    println!("Initializing db...");
    fs::create_dir_all(db_path)
        .unwrap_or_else(|err| println!("Ignoring db directory create failed: {}", err));

    let db = async_db(db_path)
        .await
        .context("Failed to connect to db")?;
    db.call(|conn| {
        initialize_db(conn)?;
        Ok(())
    })
    .await?;
    println!("Finished initializing db");

    Ok(())
}
