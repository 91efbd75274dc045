use kustbot::config::settings_override;
use kustbot::{Pipeline, Session, Settings};
use std::io;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays the chat transcript
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kustbot=warn")),
        )
        .with_writer(io::stderr)
        .init();

    // Startup failures are reported and the process exits cleanly
    let pipeline = match Settings::load(settings_override().as_deref())
        .and_then(|settings| Pipeline::from_settings(&settings))
    {
        Ok(pipeline) => pipeline,
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let summary = Session::new(pipeline, stdin.lock(), stdout.lock())
        .run()
        .await?;

    info!(
        turns = summary.turns,
        failures = summary.failures,
        "chat session closed"
    );
    Ok(())
}
