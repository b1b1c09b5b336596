use clap::Parser;
use workspace_viewer::{build_rocket, config::Config};

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();

    // Launch blocks until the server shuts down:
    build_rocket(&config).launch().await?;

    Ok(())
}
