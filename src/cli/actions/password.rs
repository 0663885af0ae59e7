use super::run::failed;
use crate::auth::AuthController;
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub current: SecretString,
    pub new: SecretString,
}

/// # Errors
/// Returns an error if the password change fails.
pub async fn execute(controller: &AuthController, args: Args) -> Result<()> {
    controller
        .change_password(&args.current, &args.new)
        .await
        .map_err(failed("password change"))
}
