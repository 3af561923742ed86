//! Resolve a Battle of the Bits identifier from the command line.
//!
//! ```bash
//! cargo run -p provider-botb --features desktop-shims --example resolve -- "botb chiptune"
//! cargo run -p provider-botb --features desktop-shims --example resolve -- \
//!     https://battleofthebits.org/arena/Entry/12345/
//! ```

use anyhow::{bail, Context};
use bridge_traits::logging::LogLevel;
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use core_runtime::SourceConfig;
use provider_botb::{BotbSourceManager, ResolutionOutcome};
use std::env;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let identifier = env::args()
        .nth(1)
        .context("usage: resolve <identifier>")?;

    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug),
    )?;

    let config = SourceConfig::builder().build()?;
    let source = BotbSourceManager::with_symphonia(&config);

    match source.resolve(&identifier).await? {
        None => bail!("{:?} is not a Battle of the Bits identifier", identifier),
        Some(ResolutionOutcome::Resolved(track)) => {
            println!("title:     {}", track.track.title);
            println!("author:    {}", track.track.author);
            println!("media:     {}", track.track.media_url);
            if let Some(duration) = track.track.duration_millis {
                println!("duration:  {} ms", duration);
            }
            println!("container: {}", track.container);

            let blob = source.encode_track(&track)?;
            println!("encoded:   {} bytes", blob.len());
        }
        Some(ResolutionOutcome::Redirected(reference)) => {
            println!("redirected to {}", reference.identifier);
        }
        Some(outcome) => {
            println!("{}", outcome.user_message().unwrap_or("unresolved"));
        }
    }

    Ok(())
}
