//! Thin wrappers for the Identity API auth endpoints. They centralize paths
//! and payload shapes so controller code never builds requests by hand.
//! Payloads carry passwords and tokens and must never be logged.

use super::types::{
    AccountPayload, AuthResponse, ChangePasswordRequest, LoginRequest, RefreshRequest,
    RegisterRequest, TokenPair,
};
use crate::api::{paths, ApiClient, Bearer, TransportError};

/// Posts credentials to one of the login endpoints.
pub(crate) async fn login(
    api: &ApiClient,
    endpoint: &str,
    request: &LoginRequest<'_>,
) -> Result<AuthResponse, TransportError> {
    api.post_json(endpoint, request, Bearer::Anonymous).await
}

/// Creates a partner account; the response signs the new partner in.
pub(crate) async fn register(
    api: &ApiClient,
    request: &RegisterRequest<'_>,
) -> Result<AuthResponse, TransportError> {
    api.post_json(paths::REGISTER, request, Bearer::Anonymous).await
}

/// Fetches role, permissions and profile of the bearer.
pub(crate) async fn fetch_profile(
    api: &ApiClient,
    bearer: Bearer<'_>,
) -> Result<AccountPayload, TransportError> {
    api.get_json(paths::PROFILE, bearer).await
}

/// Revokes the refresh token server-side.
pub(crate) async fn logout(
    api: &ApiClient,
    request: &RefreshRequest<'_>,
    bearer: Bearer<'_>,
) -> Result<(), TransportError> {
    api.post_json_empty(paths::LOGOUT, request, bearer).await
}

/// Exchanges the refresh token for a new pair.
pub(crate) async fn refresh(
    api: &ApiClient,
    request: &RefreshRequest<'_>,
) -> Result<TokenPair, TransportError> {
    api.post_json(paths::REFRESH, request, Bearer::Anonymous).await
}

pub(crate) async fn change_password(
    api: &ApiClient,
    request: &ChangePasswordRequest<'_>,
    bearer: Bearer<'_>,
) -> Result<(), TransportError> {
    api.post_json_empty(paths::CHANGE_PASSWORD, request, bearer).await
}
