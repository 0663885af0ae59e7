use crate::cli::{
    actions::Action,
    commands::{self, logging},
    dispatch,
    globals::GlobalArgs,
    telemetry,
};
use anyhow::Result;

/// Main entry point for the CLI - builds the Action and the shared settings
///
/// # Errors
///
/// Returns an error if logging initialization or action dispatch fails
pub fn start() -> Result<(Action, GlobalArgs)> {
    // 1. Parse command-line arguments
    let matches = commands::new().get_matches();

    // 2. Initialize logging before anything can log
    telemetry::init(logging::level(&matches), logging::format(&matches))?;

    // 3. Dispatch to appropriate action
    let globals = dispatch::globals(&matches);
    let action = dispatch::handler(&matches)?;

    // 4. Return the action for execution by the binary
    Ok((action, globals))
}
