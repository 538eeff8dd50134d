//! handoff-console - drive the handoff stack from stdin.
//!
//! Every line is either a message (`alice hi`, `agents:x hello`) or a
//! slash command (`/connect alice x`, `/show alice`). See `/help`.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use handoff::adapters::console::{ConsoleSession, Step};
use handoff::config::AppConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    config
        .logging
        .init()
        .context("failed to initialize logging")?;

    info!(
        environment = ?config.logging.environment,
        implicit_connect = config.routing.implicit_connect,
        "handoff console starting"
    );

    let session = ConsoleSession::from_config(&config);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(config.console.prompt.as_bytes()).await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
            break;
        };

        match session.run_line(&line).await {
            Step::Quit => break,
            Step::Continue(output) => {
                for out in output {
                    stdout.write_all(out.as_bytes()).await?;
                    stdout.write_all(b"\n").await?;
                }
            }
        }
    }

    info!("handoff console stopped");
    Ok(())
}
