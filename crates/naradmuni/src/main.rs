use anyhow::Result;
use naradmuni::commands::run_app;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = run_app().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
