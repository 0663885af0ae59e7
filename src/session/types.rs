//! Session data model. The identity fields (role, permissions, profile and
//! credential pair) only exist together inside [`Identity`], so an anonymous
//! session cannot carry a stray profile or token.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{collections::BTreeSet, fmt, str::FromStr};
use thiserror::Error;

/// Actor role. Determines which route families are reachable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Role {
    SuperAdmin,
    Admin,
    Partner,
    #[default]
    None,
}

impl Role {
    pub const ALL: [Self; 4] = [Self::SuperAdmin, Self::Admin, Self::Partner, Self::None];

    /// Canonical tag used in the durable session record.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "superadmin",
            Self::Admin => "admin",
            Self::Partner => "influenceur",
            Self::None => "none",
        }
    }

    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "superadmin" | "super_admin" | "superuser" => Ok(Self::SuperAdmin),
            "admin" => Ok(Self::Admin),
            "influenceur" | "partner" => Ok(Self::Partner),
            "none" | "" => Ok(Self::None),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Access/refresh token pair. Always replaced as a whole.
#[derive(Clone)]
pub struct CredentialPair {
    access_token: SecretString,
    refresh_token: SecretString,
}

impl CredentialPair {
    #[must_use]
    pub fn new(access_token: SecretString, refresh_token: SecretString) -> Self {
        Self {
            access_token,
            refresh_token,
        }
    }

    #[must_use]
    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    #[must_use]
    pub fn refresh_token(&self) -> &SecretString {
        &self.refresh_token
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

impl PartialEq for CredentialPair {
    fn eq(&self, other: &Self) -> bool {
        self.access_token.expose_secret() == other.access_token.expose_secret()
            && self.refresh_token.expose_secret() == other.refresh_token.expose_secret()
    }
}

impl Eq for CredentialPair {}

/// Capability names granted alongside the profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    #[must_use]
    pub fn contains(&self, permission: &str) -> bool {
        self.0.contains(permission)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: String,
    pub display_name: String,
    pub email: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerProfile {
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub affiliation_code: String,
    /// Bonus paid per referral, as decimal text from the server.
    pub bonus_per_referral: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Profile {
    Admin(AdminProfile),
    Partner(PartnerProfile),
}

impl Profile {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Admin(profile) => &profile.id,
            Self::Partner(profile) => &profile.id,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Admin(profile) => &profile.display_name,
            Self::Partner(profile) => &profile.display_name,
        }
    }

    #[must_use]
    pub fn email(&self) -> &str {
        match self {
            Self::Admin(profile) => &profile.email,
            Self::Partner(profile) => &profile.email,
        }
    }

    #[must_use]
    pub fn as_partner(&self) -> Option<&PartnerProfile> {
        match self {
            Self::Partner(profile) => Some(profile),
            Self::Admin(_) => None,
        }
    }

    /// Whether this profile shape belongs to `role`.
    #[must_use]
    pub fn matches_role(&self, role: Role) -> bool {
        match self {
            Self::Admin(_) => role.is_admin(),
            Self::Partner(_) => role == Role::Partner,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("an authenticated identity cannot have role `none`")]
    AnonymousRole,
    #[error("profile shape does not match role `{0}`")]
    ProfileMismatch(Role),
}

/// Everything known about an authenticated actor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    role: Role,
    permissions: PermissionSet,
    profile: Profile,
    credential: CredentialPair,
}

impl Identity {
    /// # Errors
    /// Returns an error when `role` is `None` or the profile variant does not
    /// belong to `role`.
    pub fn new(
        role: Role,
        permissions: PermissionSet,
        profile: Profile,
        credential: CredentialPair,
    ) -> Result<Self, IdentityError> {
        if role == Role::None {
            return Err(IdentityError::AnonymousRole);
        }
        if !profile.matches_role(role) {
            return Err(IdentityError::ProfileMismatch(role));
        }

        Ok(Self {
            role,
            permissions,
            profile,
            credential,
        })
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    #[must_use]
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    #[must_use]
    pub fn credential(&self) -> &CredentialPair {
        &self.credential
    }

    pub(crate) fn set_permissions(&mut self, permissions: PermissionSet) {
        self.permissions = permissions;
    }

    pub(crate) fn set_profile(&mut self, profile: Profile) -> Result<(), IdentityError> {
        if !profile.matches_role(self.role) {
            return Err(IdentityError::ProfileMismatch(self.role));
        }
        self.profile = profile;
        Ok(())
    }

    pub(crate) fn set_credential(&mut self, credential: CredentialPair) {
        self.credential = credential;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionStatus {
    /// Startup rehydration has not finished yet.
    #[default]
    Loading,
    Ready,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    status: SessionStatus,
    identity: Option<Identity>,
}

impl Session {
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }

    #[must_use]
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.identity.as_ref().map_or(Role::None, Identity::role)
    }

    #[must_use]
    pub fn permissions(&self) -> Option<&PermissionSet> {
        self.identity.as_ref().map(Identity::permissions)
    }

    #[must_use]
    pub fn profile(&self) -> Option<&Profile> {
        self.identity.as_ref().map(Identity::profile)
    }

    #[must_use]
    pub fn credential(&self) -> Option<&CredentialPair> {
        self.identity.as_ref().map(Identity::credential)
    }

    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions()
            .is_some_and(|permissions| permissions.contains(permission))
    }

    pub(crate) fn set_status(&mut self, status: SessionStatus) {
        self.status = status;
    }

    pub(crate) fn identity_mut(&mut self) -> Option<&mut Identity> {
        self.identity.as_mut()
    }

    pub(crate) fn replace_identity(&mut self, identity: Option<Identity>) {
        self.identity = identity;
    }
}
