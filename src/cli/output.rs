//! CLI output: error mapping and exit codes.

use crate::error::GroveError;

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &GroveError) -> String {
    match e {
        GroveError::ConfigError(msg) => format!("Configuration error: {}", msg),
        other => other.to_string(),
    }
}

/// Exit code for a rendered page status: 0 on success, 2 for not found,
/// 1 for anything else.
pub fn exit_code_for_status(status: u16) -> i32 {
    match status {
        0..=399 => 0,
        404 => 2,
        _ => 1,
    }
}
