use clap::Parser;
use dotenvy::dotenv;
use task_buddy::{cli::Cli, errors::Result};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so command output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Non-fatal, variables can be set externally
    dotenv().ok();

    let cli = Cli::parse();
    task_buddy::cli::run(cli)
        .await
        .inspect_err(|e| error!("Command failed: {e}"))
}
