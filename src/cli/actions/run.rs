use crate::{
    api::ApiError,
    cli::{
        actions::{access, login, logout, password, refresh, register, status, Action},
        globals::GlobalArgs,
    },
};
use anyhow::{anyhow, Result};
use tracing::debug;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions. Every invocation is
// a fresh start, so the stored session is rehydrated before the action runs.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action, globals: &GlobalArgs) -> Result<()> {
    let controller = globals.controller()?;

    if let Err(err) = controller.check_auth_status().await {
        debug!(kind = %err.kind, "session not restored");
    }

    match action {
        Action::Login(args) => login::execute(&controller, args).await,
        Action::Register(args) => register::execute(&controller, args).await,
        Action::Logout => logout::execute(&controller).await,
        Action::ChangePassword(args) => password::execute(&controller, args).await,
        Action::Refresh(args) => refresh::execute(&controller, args).await,
        Action::Status => status::status(&controller),
        Action::Whoami => status::whoami(&controller),
        Action::Access(args) => access::execute(&controller, &args),
    }
}

/// Turns a reported failure into the command's exit error. The user already
/// saw the localized message through the notifier.
pub(super) fn failed(operation: &'static str) -> impl FnOnce(ApiError) -> anyhow::Error {
    move |err| anyhow!("{operation} failed: {}", err.kind)
}
