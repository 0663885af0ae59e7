//! Read-only subcommands over the restored session.

use clap::{Arg, Command};

pub const CMD_STATUS: &str = "status";
pub const CMD_WHOAMI: &str = "whoami";
pub const CMD_ACCESS: &str = "access";

pub const ARG_PATH: &str = "path";

#[must_use]
pub fn status() -> Command {
    Command::new(CMD_STATUS).about("Show the session: role, profile and permissions")
}

#[must_use]
pub fn whoami() -> Command {
    Command::new(CMD_WHOAMI).about("Print the signed-in actor")
}

#[must_use]
pub fn access() -> Command {
    Command::new(CMD_ACCESS)
        .about("Show the guard decision for a front-end route")
        .arg(
            Arg::new(ARG_PATH)
                .help("Route path, for example /admin/dashboard")
                .required(true),
        )
}
