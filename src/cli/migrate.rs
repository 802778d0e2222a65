use crate::core::db::{async_db, migrate_db};
use anyhow::{Context, Result};

pub async fn run(db: bool, db_path: &str) -> Result<()> {
    if !db {
        println!("Nothing to migrate, pass \"--db\"");
        return Ok(());
    }

    println!("Migrating db...");
    let db = async_db(db_path)
        .await
        .context("Failed to connect to db")?;
    db.call(|conn| {
        migrate_db(conn)?;
        Ok(())
    })
    .await?;
    println!("Finished migrating db");

    Ok(())
}
