//! Command-line arguments.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use day_resolver::{
    DateExpressionResolver, DateTool, FixedClock, MatchMode, ResolveOptions, SystemClock,
};

/// Resolve relative day expressions ("tomorrow", "5 days ago") to calendar dates.
#[derive(Parser, Debug)]
#[command(name = "dayres")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a single expression and print the date
    Resolve {
        /// The expression, e.g. "in 3 days"
        expression: String,

        /// Print the tool response object ({"date": ...}) instead of a bare date
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        clock: ClockArgs,
    },

    /// Serve the get_date_from_input tool over stdio (JSON-RPC 2.0)
    Serve {
        #[command(flatten)]
        clock: ClockArgs,
    },
}

/// Where "today" comes from and how strictly phrases are matched.
#[derive(Args, Debug, Clone)]
pub struct ClockArgs {
    /// Pin today's date (YYYY-MM-DD) instead of reading the system clock
    #[arg(long, env = "DAYRES_TODAY", value_parser = FixedClock::parse)]
    pub today: Option<FixedClock>,

    /// IANA timezone used to read today's date from the system clock
    #[arg(long, env = "DAYRES_TIMEZONE", conflicts_with = "today")]
    pub timezone: Option<String>,

    /// Require the whole expression to match (no trailing text)
    #[arg(long, env = "DAYRES_STRICT")]
    pub strict: bool,
}

impl ClockArgs {
    pub fn build_tool(&self) -> Result<DateTool> {
        let match_mode = if self.strict {
            MatchMode::Strict
        } else {
            MatchMode::Prefix
        };
        let resolver = DateExpressionResolver::new(ResolveOptions { match_mode });

        let tool = match (self.today, self.timezone.as_deref()) {
            (Some(fixed), _) => DateTool::new(resolver, fixed),
            (None, Some(name)) => {
                let clock = SystemClock::in_timezone(name)
                    .with_context(|| format!("Failed to configure clock for timezone {name}"))?;
                DateTool::new(resolver, clock)
            }
            (None, None) => DateTool::new(resolver, SystemClock::local()),
        };

        Ok(tool)
    }
}
