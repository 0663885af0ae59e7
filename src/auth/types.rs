//! Request and response payloads of the Identity API. Requests carry
//! passwords and tokens, so they must never be logged.

use crate::{
    api::{ApiError, ErrorKind},
    session::{AdminProfile, PartnerProfile, Profile, Role},
};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::OnceLock;

static EMAIL_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

/// Identifier and secret entered on a login form.
#[derive(Clone, Debug)]
pub struct LoginCredentials {
    pub identifier: String,
    pub secret: SecretString,
}

impl LoginCredentials {
    #[must_use]
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: SecretString::from(secret.into()),
        }
    }

    /// Rejects blank fields before any request is sent.
    ///
    /// # Errors
    /// Returns `BadRequest` when the identifier or the secret is empty.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.identifier.trim().is_empty() || self.secret.expose_secret().is_empty() {
            return Err(ApiError::new(ErrorKind::BadRequest)
                .with_message("Veuillez saisir votre e-mail et votre mot de passe."));
        }
        Ok(())
    }
}

/// Fields of a new partner account.
#[derive(Clone, Debug)]
pub struct PartnerRegistration {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: SecretString,
}

impl PartnerRegistration {
    /// Checks required fields and the e-mail shape.
    ///
    /// # Errors
    /// Returns `BadRequest` for a missing field, `ValidationFailed` for a
    /// malformed e-mail.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.first_name.trim().is_empty()
            || self.last_name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.expose_secret().is_empty()
        {
            return Err(ApiError::new(ErrorKind::BadRequest)
                .with_message("Veuillez remplir tous les champs obligatoires."));
        }

        if !valid_email(self.email.trim()) {
            return Err(ApiError::new(ErrorKind::ValidationFailed)
                .with_message("email: Adresse e-mail invalide."));
        }

        Ok(())
    }
}

fn valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
        .is_some_and(|regex| regex.is_match(email))
}

#[derive(Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'a str>,
    pub password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh: &'a str,
}

#[derive(Serialize)]
pub(crate) struct ChangePasswordRequest<'a> {
    pub old_password: &'a str,
    pub new_password: &'a str,
}

/// Issued by login, register and refresh.
#[derive(Deserialize)]
pub(crate) struct TokenPair {
    #[serde(alias = "access_token")]
    pub access: String,
    #[serde(alias = "refresh_token")]
    pub refresh: String,
}

/// Login and register responses.
#[derive(Deserialize)]
pub(crate) struct AuthResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    #[serde(flatten)]
    pub account: AccountPayload,
}

/// Role, permissions and the profile payloads; shared by login and profile
/// responses. Only the payload matching the declared role is used.
#[derive(Deserialize, Default)]
pub(crate) struct AccountPayload {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub user: Option<AdminPayload>,
    #[serde(default)]
    pub influenceur: Option<PartnerPayload>,
}

#[derive(Deserialize)]
pub(crate) struct AdminPayload {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct PartnerPayload {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(alias = "code_affiliation", alias = "code_parrainage")]
    pub affiliation_code: String,
    #[serde(
        default,
        alias = "montant_remise",
        alias = "remise_par_parrainage",
        deserialize_with = "optional_string_or_number"
    )]
    pub bonus_per_referral: Option<String>,
}

impl From<AdminPayload> for Profile {
    fn from(payload: AdminPayload) -> Self {
        let display_name = display_name(
            payload.first_name.as_deref(),
            payload.last_name.as_deref(),
            payload.username.as_deref(),
            &payload.email,
        );
        Self::Admin(AdminProfile {
            id: payload.id,
            display_name,
            email: payload.email,
        })
    }
}

impl From<PartnerPayload> for Profile {
    fn from(payload: PartnerPayload) -> Self {
        let display_name = display_name(
            payload.first_name.as_deref(),
            payload.last_name.as_deref(),
            payload.username.as_deref(),
            &payload.email,
        );
        Self::Partner(PartnerProfile {
            id: payload.id,
            display_name,
            email: payload.email,
            affiliation_code: payload.affiliation_code,
            bonus_per_referral: payload
                .bonus_per_referral
                .unwrap_or_else(|| "0".to_string()),
        })
    }
}

/// "First Last", then the username, then the e-mail.
fn display_name(
    first_name: Option<&str>,
    last_name: Option<&str>,
    username: Option<&str>,
    email: &str,
) -> String {
    let full = [first_name, last_name]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if !full.is_empty() {
        return full;
    }

    username
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(email)
        .to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl From<Scalar> for String {
    fn from(value: Scalar) -> Self {
        match value {
            Scalar::Text(text) => text,
            Scalar::Integer(number) => number.to_string(),
            Scalar::Float(number) => number.to_string(),
        }
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Scalar::deserialize(deserializer).map(String::from)
}

fn optional_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}
