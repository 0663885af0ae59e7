//! Transport failures and their classification into the fixed error taxonomy
//! shown to users. The classifier never fails: anything it cannot recognize
//! becomes [`ErrorKind::Unknown`].

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Maximum number of error body characters kept on an error.
const MAX_ERROR_CHARS: usize = 200;

/// Raw failure of a request/response cycle, before classification.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {}", sanitize_body(.body).unwrap_or_default())]
    Http { status: u16, body: String },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Request error: {0}")]
    Serialization(String),
}

/// Closed set of error kinds surfaced to callers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NetworkUnreachable,
    Timeout,
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    ValidationFailed,
    ServerError,
    Unknown,
}

impl ErrorKind {
    /// Localized default message for this kind.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::NetworkUnreachable => {
                "Impossible de joindre le serveur. Vérifiez votre connexion internet."
            }
            Self::Timeout => "Le serveur met trop de temps à répondre. Veuillez réessayer.",
            Self::BadRequest => "La requête est invalide. Vérifiez les informations saisies.",
            Self::Unauthorized => "Identifiants invalides ou session expirée.",
            Self::Forbidden => "Vous n'avez pas les droits nécessaires pour cette action.",
            Self::NotFound => "La ressource demandée est introuvable.",
            Self::ValidationFailed => "Certains champs sont invalides.",
            Self::ServerError => "Erreur du serveur. Veuillez réessayer plus tard.",
            Self::Unknown => "Une erreur inattendue est survenue.",
        }
    }

    /// Kinds that mean the credential itself was rejected.
    #[must_use]
    pub const fn rejects_credential(self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NetworkUnreachable => "network_unreachable",
            Self::Timeout => "timeout",
            Self::BadRequest => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not_found",
            Self::ValidationFailed => "validation_failed",
            Self::ServerError => "server_error",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Classified error returned by every auth operation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    pub status: Option<u16>,
    /// Server-provided detail, kept for logs only.
    pub detail: Option<String>,
}

impl ApiError {
    /// Builds an error carrying the default message of `kind`.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.default_message().to_string(),
            status: None,
            detail: None,
        }
    }

    /// Overrides the user-facing message for a specific call site.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl From<ErrorKind> for ApiError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        classify(&err)
    }
}

/// Maps a transport failure into the error taxonomy.
///
/// Priority: no response, client-side timeout, HTTP status, then a structured
/// validation payload on statuses that have no mapping of their own.
#[must_use]
pub fn classify(err: &TransportError) -> ApiError {
    match err {
        TransportError::Network(message) => {
            ApiError::new(ErrorKind::NetworkUnreachable).with_detail(message.clone())
        }
        TransportError::Timeout(message) => {
            ApiError::new(ErrorKind::Timeout).with_detail(message.clone())
        }
        TransportError::Http { status, body } => classify_status(*status, body),
        TransportError::Config(message)
        | TransportError::Parse(message)
        | TransportError::Serialization(message) => {
            ApiError::new(ErrorKind::Unknown).with_detail(message.clone())
        }
    }
}

fn classify_status(status: u16, body: &str) -> ApiError {
    let payload: Option<Value> = serde_json::from_str(body).ok();
    let field_errors = payload.as_ref().and_then(validation_errors);

    let kind = match status {
        400 => ErrorKind::BadRequest,
        401 => ErrorKind::Unauthorized,
        403 => ErrorKind::Forbidden,
        404 => ErrorKind::NotFound,
        422 => ErrorKind::ValidationFailed,
        500..=599 => ErrorKind::ServerError,
        _ if field_errors.is_some() => ErrorKind::ValidationFailed,
        _ => ErrorKind::Unknown,
    };

    let mut error = ApiError::new(kind);
    error.status = Some(status);

    // Field errors are what the user needs to fix the form.
    if matches!(kind, ErrorKind::ValidationFailed | ErrorKind::BadRequest) {
        if let Some(joined) = field_errors {
            error.message = joined;
        }
    }

    error.detail = payload
        .as_ref()
        .and_then(server_detail)
        .or_else(|| sanitize_body(body));

    error
}

/// Extracts `detail` or `message` from a JSON error body.
fn server_detail(payload: &Value) -> Option<String> {
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| payload.get(key).and_then(Value::as_str))
        .map(|text| text.chars().take(MAX_ERROR_CHARS).collect())
}

/// Joins field-level errors from `{"field": ["msg"]}` or `{"errors": {...}}`
/// payloads. Returns `None` when the body is not a validation payload.
fn validation_errors(payload: &Value) -> Option<String> {
    let fields = payload.get("errors").unwrap_or(payload);

    let mut messages = Vec::new();
    match fields {
        Value::Object(map) => {
            for (field, value) in map {
                if field == "detail" || field == "message" {
                    continue;
                }
                let texts = messages_of(value);
                if texts.is_empty() {
                    continue;
                }
                if field == "non_field_errors" || field == "__all__" {
                    messages.push(texts.join(" "));
                } else {
                    messages.push(format!("{field}: {}", texts.join(" ")));
                }
            }
        }
        Value::Array(_) if payload.get("errors").is_some() => {
            messages.extend(messages_of(fields));
        }
        _ => return None,
    }

    if messages.is_empty() {
        None
    } else {
        Some(messages.join("; "))
    }
}

fn messages_of(value: &Value) -> Vec<String> {
    match value {
        Value::String(text) => vec![text.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.clone()),
                Value::Object(object) => object
                    .get("message")
                    .or_else(|| object.get("msg"))
                    .and_then(Value::as_str)
                    .map(ToString::to_string),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Trims and truncates a raw body for logs.
pub(crate) fn sanitize_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.chars().take(MAX_ERROR_CHARS).collect())
    }
}
