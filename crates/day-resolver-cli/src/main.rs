//! dayres CLI entry point.

mod cli;
mod protocol;
mod server;

use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use clap::Parser;
use day_resolver::DateToolRequest;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands};
use crate::server::ToolServer;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Resolve {
            expression,
            json,
            clock,
        } => {
            let tool = clock.build_tool()?;
            let response = tool.call(&DateToolRequest {
                date_input: expression.clone(),
            });

            let mut stdout = io::stdout().lock();
            if json {
                serde_json::to_writer(&mut stdout, &response)
                    .context("Failed to write JSON response")?;
                writeln!(stdout)?;
            } else {
                match response.date {
                    Some(date) => writeln!(stdout, "{date}")?,
                    None => bail!("unrecognized date expression: '{}'", expression.trim()),
                }
            }
        }

        Commands::Serve { clock } => {
            let server = ToolServer::new(clock.build_tool()?);
            server.run(io::stdin().lock(), io::stdout().lock())?;
        }
    }

    Ok(())
}

/// Log to stderr; stdout is reserved for results and protocol frames.
fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("dayres={log_level},day_resolver={log_level}"))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}
