//! Session, authentication and access control for the affiliate program
//! front-end.
//!
//! The crate owns the client-side view of "who is signed in": it acquires and
//! renews credentials against the Identity API, keeps the current session in a
//! single [`session::SessionStore`], persists it across restarts, and decides
//! for every route whether the actor may see it.
//!
//! ## Flow Overview
//!
//! 1. **Startup:** [`auth::AuthController::check_auth_status`] reads the durable
//!    session record. Without one the session becomes `Ready` and anonymous
//!    without any network call; with one the profile endpoint is queried and
//!    the session is rebuilt (or purged when the credential is rejected).
//! 2. **Login:** one of the three login flows posts the credentials, selects
//!    the admin or partner profile shape from the declared role and
//!    establishes the session. Failures never touch an existing session.
//! 3. **Navigation:** [`guard::guard`] turns the session and a route's
//!    required role into render, wait, or redirect.
//! 4. **Logout:** always succeeds locally; the remote invalidation is best
//!    effort.
//!
//! Tokens and passwords are held as `SecretString` and must never be logged.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod guard;
pub mod parrain;
pub mod session;
