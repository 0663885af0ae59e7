//! Builds role-shaped identities from API payloads. The declared role selects
//! which profile payload is read; the other one is ignored.

use super::{
    client,
    types::{AccountPayload, TokenPair},
};
use crate::{
    api::{ApiClient, ApiError, Bearer, ErrorKind},
    session::{CredentialPair, Identity, PermissionSet, Profile, Role},
};
use secrecy::SecretString;

/// Role, permissions and profile as returned by the API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedAccount {
    pub role: Role,
    pub permissions: PermissionSet,
    pub profile: Profile,
}

impl LoadedAccount {
    /// Combines the account with a credential pair.
    ///
    /// # Errors
    /// Never fails in practice: the profile was selected by the role.
    pub fn into_identity(self, credential: CredentialPair) -> Result<Identity, ApiError> {
        Identity::new(self.role, self.permissions, self.profile, credential).map_err(|err| {
            ApiError::new(ErrorKind::Unknown).with_detail(format!("inconsistent account: {err}"))
        })
    }
}

/// Picks the profile payload matching the declared role.
///
/// `Role::None` (or no role at all) is `Forbidden`: the account exists but
/// has no access to this application. A missing payload is `Unknown`.
pub(crate) fn resolve_account(payload: AccountPayload) -> Result<LoadedAccount, ApiError> {
    let role = payload.role.unwrap_or_default();
    let profile = match role {
        Role::SuperAdmin | Role::Admin => payload.user.map(Profile::from),
        Role::Partner => payload.influenceur.map(Profile::from),
        Role::None => {
            return Err(ApiError::new(ErrorKind::Forbidden)
                .with_detail("account has no role in this application"));
        }
    };

    let Some(profile) = profile else {
        return Err(ApiError::new(ErrorKind::Unknown)
            .with_detail(format!("response has no profile for role {role}")));
    };

    Ok(LoadedAccount {
        role,
        permissions: payload.permissions.into_iter().collect(),
        profile,
    })
}

/// Fetches and resolves the bearer's account.
///
/// # Errors
/// Returns the classified transport error, or the resolution error.
pub async fn load_profile(api: &ApiClient, bearer: Bearer<'_>) -> Result<LoadedAccount, ApiError> {
    let payload = client::fetch_profile(api, bearer).await?;
    resolve_account(payload)
}

/// Wraps issued tokens into a credential pair.
pub(crate) fn credential_from(tokens: TokenPair) -> Result<CredentialPair, ApiError> {
    if tokens.access.is_empty() || tokens.refresh.is_empty() {
        return Err(ApiError::new(ErrorKind::Unknown).with_detail("response carries an empty token"));
    }

    Ok(CredentialPair::new(
        SecretString::from(tokens.access),
        SecretString::from(tokens.refresh),
    ))
}
