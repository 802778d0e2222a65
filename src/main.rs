use anyhow::Result;
use mail::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
