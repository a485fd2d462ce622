//! # day-resolver
//!
//! Deterministic resolution of relative day expressions for AI agents.
//!
//! Turns phrases like "tomorrow", "5 days ago" or "in 3 days" into concrete
//! calendar dates, so a model calling a scheduling tool never has to do date
//! arithmetic by inference. Unrecognized phrases resolve to `None` instead of
//! a guess.
//!
//! ## Modules
//!
//! - [`resolver`] — phrase → date, driven by an ordered rule table
//! - [`clock`] — injectable sources of "today"
//! - [`tool`] — `get_date_from_input` request/response contract for tool servers
//! - [`error`] — Error types

pub mod clock;
pub mod error;
pub mod resolver;
pub mod tool;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::ResolverError;
pub use resolver::{
    resolve_date, resolve_date_with_options, DateExpressionResolver, MatchMode, ResolveOptions,
    ResolvedDate, Rule,
};
pub use tool::{DateTool, DateToolRequest, DateToolResponse, ToolDefinition, TOOL_NAME};
