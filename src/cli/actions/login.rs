use super::run::failed;
use crate::{
    auth::{AuthController, LoginCredentials, LoginFlow},
    guard::home_for,
};
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub flow: LoginFlow,
    pub email: String,
    pub password: SecretString,
}

/// Signs in and prints the landing route of the role.
/// # Errors
/// Returns an error if the login fails.
pub async fn execute(controller: &AuthController, args: Args) -> Result<()> {
    let credentials = LoginCredentials {
        identifier: args.email,
        secret: args.password,
    };

    let role = controller
        .login_with(args.flow, &credentials)
        .await
        .map_err(failed("login"))?;

    println!("{}", home_for(role));

    Ok(())
}
