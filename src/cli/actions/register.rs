use super::run::failed;
use crate::{
    auth::{AuthController, PartnerRegistration},
    guard::home_for,
};
use anyhow::Result;
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: SecretString,
}

/// Creates the partner account and prints the partner home route.
/// # Errors
/// Returns an error if the registration fails.
pub async fn execute(controller: &AuthController, args: Args) -> Result<()> {
    let registration = PartnerRegistration {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        phone: args.phone,
        password: args.password,
    };

    let role = controller
        .register(&registration)
        .await
        .map_err(failed("registration"))?;

    println!("{}", home_for(role));

    Ok(())
}
