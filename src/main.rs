use buoy_pipeline::cli::{run, Cli};
use buoy_pipeline::error::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
