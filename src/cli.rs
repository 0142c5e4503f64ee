//! CLI domain: parse, route, output and presentation only.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::{exit_code_for_status, map_error};
pub use parse::{Cli, Commands};
pub use presentation::{format_import_summary, format_refs, RefRow};
pub use route::{CommandOutput, RunContext};
