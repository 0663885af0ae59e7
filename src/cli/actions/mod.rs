pub mod access;
pub mod login;
pub mod logout;
pub mod password;
pub mod refresh;
pub mod register;
pub mod status;

// Internal "interpreter" for `Action`.
// We keep the match in a separate module so `mod.rs` stays small as more actions are added.
mod run;

use crate::cli::globals::GlobalArgs;

#[derive(Debug)]
pub enum Action {
    Login(login::Args),
    Register(register::Args),
    Logout,
    ChangePassword(password::Args),
    Refresh(refresh::Args),
    Status,
    Whoami,
    Access(access::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self, globals: &GlobalArgs) -> anyhow::Result<()> {
        run::execute(self, globals).await
    }
}
