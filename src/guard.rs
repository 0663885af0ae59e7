//! Route guard: decides, from the current session and a route's required
//! role, whether to render, wait for rehydration, or redirect.
//!
//! All role dispatch for navigation lives here. This is a UX guard; the API
//! still enforces access on every request.

use crate::session::{Role, Session};

/// Front-end route paths.
pub mod paths {
    pub const ROOT: &str = "/";
    /// Role-selection entry point shown to anonymous visitors.
    pub const LOGIN: &str = "/login";
    pub const ADMIN_LOGIN: &str = "/admin/login";
    pub const PARTNER_LOGIN: &str = "/influenceur/login";
    pub const REGISTER: &str = "/register";
    pub const PROFILE: &str = "/profile";
    pub const CHANGE_PASSWORD: &str = "/change-password";
    pub const ADMIN_PREFIX: &str = "/admin";
    pub const ADMIN_HOME: &str = "/admin/dashboard";
    pub const ADMIN_ACCOUNTS_PREFIX: &str = "/admin/administrateurs";
    pub const PARTNER_PREFIX: &str = "/influenceur";
    pub const PARTNER_HOME: &str = "/influenceur/dashboard";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Rehydration is still running; show a neutral waiting state.
    Pending,
    Render,
    Redirect(&'static str),
}

/// Home route of each role.
#[must_use]
pub const fn home_for(role: Role) -> &'static str {
    match role {
        Role::SuperAdmin | Role::Admin => paths::ADMIN_HOME,
        Role::Partner => paths::PARTNER_HOME,
        Role::None => paths::LOGIN,
    }
}

/// Whether `role` may view a route that requires `required`.
/// `SuperAdmin` also satisfies `Admin`, never the other way round.
#[must_use]
pub const fn satisfies(role: Role, required: Role) -> bool {
    match (role, required) {
        (Role::SuperAdmin, Role::SuperAdmin | Role::Admin)
        | (Role::Admin, Role::Admin)
        | (Role::Partner, Role::Partner) => true,
        (Role::SuperAdmin | Role::Admin | Role::Partner | Role::None, _) => false,
    }
}

/// Decides access to a protected route.
#[must_use]
pub fn guard(session: &Session, required: Option<Role>) -> GuardDecision {
    if session.is_loading() {
        return GuardDecision::Pending;
    }

    let role = session.role();
    if role == Role::None {
        return GuardDecision::Redirect(paths::LOGIN);
    }

    match required {
        None => GuardDecision::Render,
        Some(required) if satisfies(role, required) => GuardDecision::Render,
        Some(_) => GuardDecision::Redirect(home_for(role)),
    }
}

/// Decision for the root path: send everyone to their home.
#[must_use]
pub fn entry_redirect(session: &Session) -> GuardDecision {
    if session.is_loading() {
        GuardDecision::Pending
    } else {
        GuardDecision::Redirect(home_for(session.role()))
    }
}

/// Access rule of a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// The root path, resolved with [`entry_redirect`].
    Entry,
    /// Login and registration pages; signed-in actors are sent home.
    Public,
    /// Any signed-in actor.
    Authenticated,
    Role(Role),
}

#[derive(Clone, Debug)]
struct Rule {
    prefix: &'static str,
    access: Access,
}

/// Maps paths to access rules. The most specific (longest) matching prefix
/// wins; unknown paths require authentication.
#[derive(Clone, Debug)]
pub struct RouteTable {
    rules: Vec<Rule>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
            .route(paths::LOGIN, Access::Public)
            .route(paths::ADMIN_LOGIN, Access::Public)
            .route(paths::PARTNER_LOGIN, Access::Public)
            .route(paths::REGISTER, Access::Public)
            .route(paths::PROFILE, Access::Authenticated)
            .route(paths::CHANGE_PASSWORD, Access::Authenticated)
            .route(paths::ADMIN_PREFIX, Access::Role(Role::Admin))
            .route(paths::ADMIN_ACCOUNTS_PREFIX, Access::Role(Role::SuperAdmin))
            .route(paths::PARTNER_PREFIX, Access::Role(Role::Partner))
    }
}

impl RouteTable {
    /// Empty table: only the root entry is known.
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    #[must_use]
    pub fn route(mut self, prefix: &'static str, access: Access) -> Self {
        self.rules.push(Rule { prefix, access });
        self
    }

    /// Access rule for `path`.
    #[must_use]
    pub fn access(&self, path: &str) -> Access {
        let path = normalize(path);
        if path == paths::ROOT {
            return Access::Entry;
        }

        self.rules
            .iter()
            .filter(|rule| matches_prefix(path, rule.prefix))
            .max_by_key(|rule| rule.prefix.len())
            .map_or(Access::Authenticated, |rule| rule.access)
    }

    /// Decision for navigating to `path` with `session`.
    #[must_use]
    pub fn decide(&self, session: &Session, path: &str) -> GuardDecision {
        match self.access(path) {
            Access::Entry => entry_redirect(session),
            Access::Public => {
                if session.is_loading() {
                    GuardDecision::Pending
                } else if session.is_authenticated() {
                    GuardDecision::Redirect(home_for(session.role()))
                } else {
                    GuardDecision::Render
                }
            }
            Access::Authenticated => guard(session, None),
            Access::Role(role) => guard(session, Some(role)),
        }
    }
}

/// Drops query, fragment and trailing slashes.
fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        paths::ROOT
    } else {
        trimmed
    }
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}
