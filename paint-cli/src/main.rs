//! # Magic Paint
//!
//! Headless command-line host for the Magic Paint engine.

use anyhow::Context;
use clap::Parser;
use paint_cli::{commands, CliArgs, Command, HostConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: info,magic_paint=debug,paint_renderer=debug).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,magic_paint=debug,paint_renderer=debug"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = CliArgs::parse();
    let host = HostConfig::from_args(&args).context("Failed to load canvas configuration")?;
    tracing::debug!(
        "Canvas config: {} layers, stamp layer {}",
        host.canvas.layer_count(),
        host.canvas.stamp_layer()
    );

    match args.command {
        Command::Replay {
            script,
            project,
            save,
            export,
        } => {
            let summary = commands::replay(
                &host,
                &script,
                project.as_deref(),
                save.as_deref(),
                export.as_deref(),
            )
            .await
            .with_context(|| format!("Failed to replay {}", script.display()))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Flatten { project, output } => {
            let (width, height) = commands::flatten(&host, &project, &output)
                .with_context(|| format!("Failed to flatten {}", project.display()))?;
            println!("{} ({width}x{height})", output.display());
        }
        Command::Import { image, output } => {
            commands::import(&host, &image, &output)
                .with_context(|| format!("Failed to import {}", image.display()))?;
            println!("{}", output.display());
        }
        Command::Inspect { project } => {
            let summary = commands::inspect(&host, &project)
                .with_context(|| format!("Failed to inspect {}", project.display()))?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}
