//! Subcommands that acquire, renew or drop credentials. Password arguments
//! hide their environment values from `--help`.

use clap::{Arg, ArgAction, Command};

pub const CMD_LOGIN: &str = "login";
pub const CMD_REGISTER: &str = "register";
pub const CMD_LOGOUT: &str = "logout";
pub const CMD_CHANGE_PASSWORD: &str = "change-password";
pub const CMD_REFRESH: &str = "refresh";

pub const ARG_AS: &str = "as";
pub const ARG_EMAIL: &str = "email";
pub const ARG_PASSWORD: &str = "password";
pub const ARG_FIRST_NAME: &str = "first-name";
pub const ARG_LAST_NAME: &str = "last-name";
pub const ARG_PHONE: &str = "phone";
pub const ARG_CURRENT_PASSWORD: &str = "current-password";
pub const ARG_NEW_PASSWORD: &str = "new-password";
pub const ARG_PROFILE: &str = "profile";

fn email() -> Arg {
    Arg::new(ARG_EMAIL)
        .short('e')
        .long("email")
        .help("Account e-mail")
        .env("PARRAIN_EMAIL")
        .required(true)
}

fn password() -> Arg {
    Arg::new(ARG_PASSWORD)
        .short('p')
        .long("password")
        .help("Account password")
        .env("PARRAIN_PASSWORD")
        .hide_env_values(true)
        .required(true)
}

#[must_use]
pub fn login() -> Command {
    Command::new(CMD_LOGIN)
        .about("Sign in and store the session")
        .arg(
            Arg::new(ARG_AS)
                .long("as")
                .help("Login flow: any role, admins only, or partners only")
                .default_value("any")
                .value_parser(["any", "admin", "partner"]),
        )
        .arg(email())
        .arg(password())
}

#[must_use]
pub fn register() -> Command {
    Command::new(CMD_REGISTER)
        .about("Create a partner account and sign it in")
        .arg(
            Arg::new(ARG_FIRST_NAME)
                .long("first-name")
                .help("First name")
                .required(true),
        )
        .arg(
            Arg::new(ARG_LAST_NAME)
                .long("last-name")
                .help("Last name")
                .required(true),
        )
        .arg(email())
        .arg(Arg::new(ARG_PHONE).long("phone").help("Phone number"))
        .arg(password())
}

#[must_use]
pub fn logout() -> Command {
    Command::new(CMD_LOGOUT).about("Sign out and remove the stored session")
}

#[must_use]
pub fn change_password() -> Command {
    Command::new(CMD_CHANGE_PASSWORD)
        .about("Change the password of the signed-in account")
        .arg(
            Arg::new(ARG_CURRENT_PASSWORD)
                .long("current-password")
                .help("Current password")
                .env("PARRAIN_CURRENT_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_NEW_PASSWORD)
                .long("new-password")
                .help("New password")
                .env("PARRAIN_NEW_PASSWORD")
                .hide_env_values(true)
                .required(true),
        )
}

#[must_use]
pub fn refresh() -> Command {
    Command::new(CMD_REFRESH)
        .about("Rotate the stored tokens")
        .arg(
            Arg::new(ARG_PROFILE)
                .long("profile")
                .help("Reload role, permissions and profile instead of rotating tokens")
                .action(ArgAction::SetTrue),
        )
}
