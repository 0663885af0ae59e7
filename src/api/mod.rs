//! Transport layer for the Identity/Resource API: the HTTP client and the
//! classifier that turns its failures into user-facing error kinds.

pub mod client;
pub mod errors;

pub use client::{ApiClient, Bearer};
pub use errors::{classify, ApiError, ErrorKind, TransportError};

/// Endpoint paths of the Identity API, relative to the configured base URL.
pub mod paths {
    pub const LOGIN: &str = "/auth/login/";
    pub const ADMIN_LOGIN: &str = "/auth/admin/login/";
    pub const PARTNER_LOGIN: &str = "/auth/influenceur/login/";
    pub const REGISTER: &str = "/auth/register/";
    pub const LOGOUT: &str = "/auth/logout/";
    pub const REFRESH: &str = "/auth/refresh/";
    pub const PROFILE: &str = "/auth/profile/";
    pub const CHANGE_PASSWORD: &str = "/auth/change-password/";
}
