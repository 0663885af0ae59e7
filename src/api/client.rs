//! HTTP client for the Identity/Resource API with a fixed timeout and
//! consistent error handling. Every request carries the caller's bearer
//! credential except the anonymous login and register calls. Callers must
//! never log request bodies: they carry passwords and tokens.

use super::errors::TransportError;
use crate::{config::AppConfig, parrain::APP_USER_AGENT, session::SessionStore};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, Instrument};
use ulid::Ulid;
use url::Url;

/// Which credential to attach to a request.
#[derive(Clone, Copy)]
pub enum Bearer<'a> {
    /// No `Authorization` header (login, register).
    Anonymous,
    /// An explicit access token, used while the session is still loading.
    Token(&'a SecretString),
    /// Whatever access token the session currently holds, read at send time.
    Session(&'a SessionStore),
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Builds a client for the configured API base URL.
    ///
    /// # Errors
    /// Returns `TransportError::Config` when the base URL is blank or invalid,
    /// or when the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, TransportError> {
        let base = config.api_base_url.trim();
        if base.is_empty() {
            return Err(TransportError::Config(
                "API base URL is not configured.".to_string(),
            ));
        }

        let url = Url::parse(base)
            .map_err(|err| TransportError::Config(format!("Invalid API base URL: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TransportError::Config(format!(
                "Unsupported API base URL scheme: {}",
                url.scheme()
            )));
        }

        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| TransportError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: base.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches JSON.
    ///
    /// # Errors
    /// Returns a `TransportError` on network failure, timeout, non-success
    /// status or undecodable body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Bearer<'_>,
    ) -> Result<T, TransportError> {
        let request = self.http.get(self.build_url(path));
        let response = self.send("GET", path, request, bearer).await?;

        handle_json_response(response).await
    }

    /// Posts JSON and parses a JSON response.
    ///
    /// # Errors
    /// Same as [`ApiClient::get_json`], plus `Serialization` when the body
    /// cannot be encoded.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        bearer: Bearer<'_>,
    ) -> Result<T, TransportError> {
        let request = self.json_post(path, body)?;
        let response = self.send("POST", path, request, bearer).await?;

        handle_json_response(response).await
    }

    /// Posts JSON and ignores the response body.
    ///
    /// # Errors
    /// Same as [`ApiClient::post_json`] except that the body is not decoded.
    pub async fn post_json_empty<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        bearer: Bearer<'_>,
    ) -> Result<(), TransportError> {
        let request = self.json_post(path, body)?;
        let response = self.send("POST", path, request, bearer).await?;

        handle_empty_response(response).await
    }

    fn json_post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<RequestBuilder, TransportError> {
        let payload = serde_json::to_vec(body)
            .map_err(|err| TransportError::Serialization(format!("Failed to encode request: {err}")))?;

        Ok(self
            .http
            .post(self.build_url(path))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload))
    }

    /// Attaches the bearer credential and a request id, then sends.
    async fn send(
        &self,
        method: &str,
        path: &str,
        request: RequestBuilder,
        bearer: Bearer<'_>,
    ) -> Result<Response, TransportError> {
        let request_id = Ulid::new().to_string();
        let mut request = request
            .header(reqwest::header::ACCEPT, "application/json")
            .header("X-Request-Id", request_id.as_str());

        match bearer {
            Bearer::Anonymous => {}
            Bearer::Token(token) => {
                request = request.bearer_auth(token.expose_secret());
            }
            Bearer::Session(store) => {
                if let Some(credential) = store.get().credential() {
                    request = request.bearer_auth(credential.access_token().expose_secret());
                }
            }
        }

        let span = tracing::debug_span!(
            "api.request",
            http.method = method,
            path = path,
            request_id = %request_id
        );

        let response = request
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        debug!(
            "{method} {path} -> {} (request id {request_id})",
            response.status()
        );

        Ok(response)
    }

    /// Joins the base URL and an endpoint path, keeping the trailing slash.
    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim().trim_start_matches('/'))
    }
}

/// Maps `reqwest` failures into transport errors with timeout detection.
fn map_request_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        TransportError::Serialization(format!("Failed to build request: {err}"))
    } else {
        TransportError::Network(format!("Unable to reach the server: {err}"))
    }
}

async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    if response.status().is_success() {
        response.json::<T>().await.map_err(|err| {
            if err.is_timeout() {
                TransportError::Timeout("Request timed out. Please try again.".to_string())
            } else {
                TransportError::Parse(format!("Failed to decode response: {err}"))
            }
        })
    } else {
        Err(http_error(response).await)
    }
}

async fn handle_empty_response(response: Response) -> Result<(), TransportError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(http_error(response).await)
    }
}

async fn http_error(response: Response) -> TransportError {
    let status: StatusCode = response.status();
    let body = response.text().await.unwrap_or_default();

    // Kept whole: the classifier parses it as JSON.
    TransportError::Http {
        status: status.as_u16(),
        body: body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::errors::{classify, ErrorKind},
        config::DEFAULT_TIMEOUT,
    };
    use anyhow::Result;
    use serde_json::{json, Value};
    use std::{path::PathBuf, time::Duration};
    use wiremock::matchers::{body_json, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(url: &str) -> AppConfig {
        AppConfig {
            api_base_url: url.to_string(),
            session_file: PathBuf::from("unused.json"),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }

    #[test]
    fn new_rejects_blank_and_invalid_base_urls() {
        assert!(matches!(
            ApiClient::new(&config("  ")),
            Err(TransportError::Config(_))
        ));
        assert!(matches!(
            ApiClient::new(&config("not a url")),
            Err(TransportError::Config(_))
        ));
        assert!(matches!(
            ApiClient::new(&config("ftp://api.parrain.dev")),
            Err(TransportError::Config(_))
        ));
    }

    #[test]
    fn build_url_joins_base_and_path() -> Result<()> {
        let client = ApiClient::new(&config("https://api.parrain.dev/api/"))?;
        assert_eq!(
            client.build_url("/auth/login/"),
            "https://api.parrain.dev/api/auth/login/"
        );
        assert_eq!(
            client.build_url("auth/profile/"),
            "https://api.parrain.dev/api/auth/profile/"
        );
        Ok(())
    }

    #[tokio::test]
    async fn attaches_explicit_bearer_token() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/profile/"))
            .and(header("Authorization", "Bearer access-1"))
            .and(header_exists("X-Request-Id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&config(&server.uri()))?;
        let token = SecretString::from("access-1".to_string());
        let body: Value = client.get_json("/auth/profile/", Bearer::Token(&token)).await?;

        assert_eq!(body["ok"], true);
        Ok(())
    }

    #[tokio::test]
    async fn anonymous_requests_have_no_authorization_header() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login/"))
            .and(body_json(json!({ "email": "a@b.fr" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = ApiClient::new(&config(&server.uri()))?;
        let _: Value = client
            .post_json("/auth/login/", &json!({ "email": "a@b.fr" }), Bearer::Anonymous)
            .await?;

        let Some(requests) = server.received_requests().await else {
            anyhow::bail!("wiremock request recording is disabled");
        };
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].headers.contains_key("authorization"));
        Ok(())
    }

    #[tokio::test]
    async fn session_bearer_without_identity_sends_no_header() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout/"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = ApiClient::new(&config(&server.uri()))?;
        let store = SessionStore::in_memory();
        client
            .post_json_empty("/auth/logout/", &json!({}), Bearer::Session(&store))
            .await?;

        let Some(requests) = server.received_requests().await else {
            anyhow::bail!("wiremock request recording is disabled");
        };
        assert!(!requests[0].headers.contains_key("authorization"));
        Ok(())
    }

    #[tokio::test]
    async fn non_success_status_becomes_http_error() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/profile/"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "detail": "expired" })),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(&config(&server.uri()))?;
        let result: Result<Value, TransportError> =
            client.get_json("/auth/profile/", Bearer::Anonymous).await;

        match result {
            Err(TransportError::Http { status, body }) => {
                assert_eq!(status, 401);
                assert!(body.contains("expired"));
            }
            other => anyhow::bail!("expected HTTP error, got {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn long_validation_body_keeps_every_field_error() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/influenceur/register/"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "email": ["Un utilisateur avec cette adresse e-mail existe déjà dans le programme."],
                "password": ["Ce mot de passe est trop court. Il doit contenir au minimum 8 caractères."],
                "phone": ["Le numéro de téléphone saisi n'est pas valide pour la France métropolitaine."]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&config(&server.uri()))?;
        let result: Result<Value, TransportError> = client
            .post_json("/auth/influenceur/register/", &json!({}), Bearer::Anonymous)
            .await;

        let Err(err) = result else {
            anyhow::bail!("expected HTTP error");
        };
        if let TransportError::Http { body, .. } = &err {
            assert!(body.chars().count() > 200);
        }

        let classified = classify(&err);
        assert_eq!(classified.kind, ErrorKind::ValidationFailed);
        assert!(classified.message.contains("email: Un utilisateur"));
        assert!(classified.message.contains("password: Ce mot de passe"));
        assert!(classified.message.contains("phone: Le numéro"));
        assert!(classified
            .detail
            .is_some_and(|detail| detail.chars().count() <= 200));
        Ok(())
    }

    #[tokio::test]
    async fn slow_server_times_out() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/profile/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let mut config = config(&server.uri());
        config.request_timeout = Duration::from_millis(50);
        let client = ApiClient::new(&config)?;
        let result: Result<Value, TransportError> =
            client.get_json("/auth/profile/", Bearer::Anonymous).await;

        assert!(matches!(result, Err(TransportError::Timeout(_))));
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_server_is_network_error() -> Result<()> {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let client = ApiClient::new(&config("http://127.0.0.1:9"))?;
        let result: Result<Value, TransportError> =
            client.get_json("/auth/profile/", Bearer::Anonymous).await;

        assert!(matches!(result, Err(TransportError::Network(_))));
        Ok(())
    }
}
