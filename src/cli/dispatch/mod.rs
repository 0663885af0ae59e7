//! Maps parsed arguments to the action to run and the shared settings.

use crate::{
    auth::LoginFlow,
    cli::{
        actions::{access, login, password, refresh, register, Action},
        commands::{
            auth::{
                ARG_AS, ARG_CURRENT_PASSWORD, ARG_EMAIL, ARG_FIRST_NAME, ARG_LAST_NAME,
                ARG_NEW_PASSWORD, ARG_PASSWORD, ARG_PHONE, ARG_PROFILE, CMD_CHANGE_PASSWORD,
                CMD_LOGIN, CMD_LOGOUT, CMD_REFRESH, CMD_REGISTER,
            },
            session::{ARG_PATH, CMD_ACCESS, CMD_STATUS, CMD_WHOAMI},
            ARG_API_URL, ARG_SESSION_FILE, ARG_TIMEOUT,
        },
        globals::GlobalArgs,
    },
    config::{AppConfig, Overrides},
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;
use std::{path::PathBuf, time::Duration};

/// Environment configuration with command-line overrides applied.
#[must_use]
pub fn globals(matches: &ArgMatches) -> GlobalArgs {
    let mut config = AppConfig::load();
    config.apply_overrides(Overrides {
        api_base_url: matches.get_one::<String>(ARG_API_URL).cloned(),
        session_file: matches.get_one::<String>(ARG_SESSION_FILE).map(PathBuf::from),
        request_timeout: matches
            .get_one::<u64>(ARG_TIMEOUT)
            .copied()
            .map(Duration::from_secs),
    });

    GlobalArgs::new(config)
}

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if the subcommand or one of its arguments is missing.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let Some((name, sub_m)) = matches.subcommand() else {
        return Err(anyhow!("missing subcommand"));
    };

    match name {
        CMD_LOGIN => Ok(Action::Login(login::Args {
            flow: login_flow(sub_m.get_one::<String>(ARG_AS).map_or("any", String::as_str))?,
            email: required(sub_m, ARG_EMAIL)?,
            password: secret(sub_m, ARG_PASSWORD)?,
        })),
        CMD_REGISTER => Ok(Action::Register(register::Args {
            first_name: required(sub_m, ARG_FIRST_NAME)?,
            last_name: required(sub_m, ARG_LAST_NAME)?,
            email: required(sub_m, ARG_EMAIL)?,
            phone: sub_m.get_one::<String>(ARG_PHONE).cloned(),
            password: secret(sub_m, ARG_PASSWORD)?,
        })),
        CMD_LOGOUT => Ok(Action::Logout),
        CMD_CHANGE_PASSWORD => Ok(Action::ChangePassword(password::Args {
            current: secret(sub_m, ARG_CURRENT_PASSWORD)?,
            new: secret(sub_m, ARG_NEW_PASSWORD)?,
        })),
        CMD_REFRESH => Ok(Action::Refresh(refresh::Args {
            profile: sub_m.get_flag(ARG_PROFILE),
        })),
        CMD_STATUS => Ok(Action::Status),
        CMD_WHOAMI => Ok(Action::Whoami),
        CMD_ACCESS => Ok(Action::Access(access::Args {
            path: required(sub_m, ARG_PATH)?,
        })),
        other => Err(anyhow!("unknown subcommand: {other}")),
    }
}

fn login_flow(value: &str) -> Result<LoginFlow> {
    match value {
        "any" => Ok(LoginFlow::Any),
        "admin" => Ok(LoginFlow::Admin),
        "partner" => Ok(LoginFlow::Partner),
        other => Err(anyhow!("unknown login flow: {other}")),
    }
}

fn required(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .with_context(|| format!("missing required argument: --{name}"))
}

fn secret(matches: &ArgMatches, name: &str) -> Result<SecretString> {
    required(matches, name).map(SecretString::from)
}
