//! Auth controller: login flows, registration, logout, password change and
//! session rehydration. It is the only writer of the session store.
//!
//! Every operation returns an [`AuthResult`] and emits a notification; none
//! of them panics. Writes that follow a network call are fenced with a
//! generation ticket taken before the call, so a late response never
//! overwrites a newer login or logout.

use super::{
    client,
    notify::{Notification, Notifier, TracingNotifier},
    profile::{self, LoadedAccount},
    types::{
        ChangePasswordRequest, LoginCredentials, LoginRequest, PartnerRegistration,
        RefreshRequest, RegisterRequest, TokenPair,
    },
};
use crate::{
    api::{paths, ApiClient, ApiError, Bearer, ErrorKind},
    session::{CredentialPair, Generation, Identity, Role, Session, SessionPatch, SessionStore},
};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub type AuthResult<T> = Result<T, ApiError>;

/// Which login endpoint to use and which roles it may sign in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginFlow {
    Any,
    Admin,
    Partner,
}

impl LoginFlow {
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Any => paths::LOGIN,
            Self::Admin => paths::ADMIN_LOGIN,
            Self::Partner => paths::PARTNER_LOGIN,
        }
    }

    /// Whether a role declared by the server may be signed in by this flow.
    #[must_use]
    pub const fn accepts(self, role: Role) -> bool {
        match self {
            Self::Any => true,
            Self::Admin => role.is_admin(),
            Self::Partner => matches!(role, Role::Partner),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthController {
    store: Arc<SessionStore>,
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
}

impl AuthController {
    /// Controller that reports notifications to the log.
    #[must_use]
    pub fn new(store: Arc<SessionStore>, api: ApiClient) -> Self {
        Self {
            store,
            api,
            notifier: Arc::new(TracingNotifier),
        }
    }

    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn session(&self) -> Session {
        self.store.get()
    }

    /// Signs in through the generic endpoint; any role is accepted.
    ///
    /// # Errors
    /// Returns the classified failure; the session is left untouched.
    pub async fn login(&self, credentials: &LoginCredentials) -> AuthResult<Role> {
        self.login_with(LoginFlow::Any, credentials).await
    }

    /// Signs in through the admin endpoint.
    ///
    /// # Errors
    /// As [`AuthController::login`], plus `Forbidden` for a non-admin account.
    pub async fn login_as_admin(&self, credentials: &LoginCredentials) -> AuthResult<Role> {
        self.login_with(LoginFlow::Admin, credentials).await
    }

    /// Signs in through the partner endpoint.
    ///
    /// # Errors
    /// As [`AuthController::login`], plus `Forbidden` for a non-partner account.
    pub async fn login_as_partner(&self, credentials: &LoginCredentials) -> AuthResult<Role> {
        self.login_with(LoginFlow::Partner, credentials).await
    }

    /// Signs in through `flow` and establishes the session.
    ///
    /// # Errors
    /// Returns the classified failure; the session is left untouched.
    #[instrument(skip(self, credentials))]
    pub async fn login_with(
        &self,
        flow: LoginFlow,
        credentials: &LoginCredentials,
    ) -> AuthResult<Role> {
        match self.try_login(flow, credentials).await {
            Ok(identity) => {
                info!(role = %identity.role(), "signed in");
                self.notifier.notify(Notification::success(format!(
                    "Connexion réussie. Bienvenue {} !",
                    identity.profile().display_name()
                )));
                Ok(identity.role())
            }
            Err(err) => Err(self.report_failure("login", err)),
        }
    }

    async fn try_login(
        &self,
        flow: LoginFlow,
        credentials: &LoginCredentials,
    ) -> AuthResult<Identity> {
        credentials.validate()?;

        let ticket = self.store.generation();
        let request = LoginRequest {
            email: credentials.identifier.trim(),
            password: credentials.secret.expose_secret(),
        };
        let response = client::login(&self.api, flow.endpoint(), &request).await?;

        let account = profile::resolve_account(response.account)?;
        if !flow.accepts(account.role) {
            return Err(ApiError::new(ErrorKind::Forbidden)
                .with_message("Ce compte n'a pas accès à cet espace.")
                .with_detail(format!("role {} cannot use the {flow:?} login", account.role)));
        }

        self.sign_in(ticket, account, response.tokens)
    }

    /// Creates a partner account and signs it in.
    ///
    /// # Errors
    /// Returns the local validation error or the classified failure; the
    /// session is left untouched.
    #[instrument(skip_all)]
    pub async fn register(&self, registration: &PartnerRegistration) -> AuthResult<Role> {
        match self.try_register(registration).await {
            Ok(identity) => {
                info!("partner account created");
                self.notifier.notify(Notification::success(format!(
                    "Inscription réussie. Bienvenue {} !",
                    identity.profile().display_name()
                )));
                Ok(identity.role())
            }
            Err(err) => Err(self.report_failure("registration", err)),
        }
    }

    async fn try_register(&self, registration: &PartnerRegistration) -> AuthResult<Identity> {
        registration.validate()?;

        let ticket = self.store.generation();
        let request = RegisterRequest {
            first_name: registration.first_name.trim(),
            last_name: registration.last_name.trim(),
            email: registration.email.trim(),
            phone: registration
                .phone
                .as_deref()
                .map(str::trim)
                .filter(|phone| !phone.is_empty()),
            password: registration.password.expose_secret(),
        };
        let mut response = client::register(&self.api, &request).await?;

        // Registration only ever creates partners.
        response.account.role = Some(Role::Partner);
        let account = profile::resolve_account(response.account)?;

        self.sign_in(ticket, account, response.tokens)
    }

    fn sign_in(
        &self,
        ticket: Generation,
        account: LoadedAccount,
        tokens: TokenPair,
    ) -> AuthResult<Identity> {
        let credential = profile::credential_from(tokens)?;
        let identity = account.into_identity(credential)?;

        match self.store.establish(ticket, identity.clone()) {
            Ok(true) => {}
            Ok(false) => return Err(session_changed()),
            Err(err) => warn!("session established but not persisted: {err}"),
        }

        Ok(identity)
    }

    /// Clears the session, then revokes the refresh token server-side on a
    /// best-effort basis. Always succeeds locally.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let credential = self.store.get().credential().cloned().or_else(|| {
            self.store
                .load_persisted()
                .map(|identity| identity.credential().clone())
        });

        if let Err(err) = self.store.clear() {
            warn!("failed to remove session record: {err}");
        }
        self.store.mark_ready();

        if let Some(credential) = credential {
            self.revoke(&credential).await;
        }

        info!("signed out");
        self.notifier
            .notify(Notification::success("Vous avez été déconnecté."));
    }

    async fn revoke(&self, credential: &CredentialPair) {
        let request = RefreshRequest {
            refresh: credential.refresh_token().expose_secret(),
        };
        if let Err(err) =
            client::logout(&self.api, &request, Bearer::Token(credential.access_token())).await
        {
            let err = ApiError::from(err);
            warn!(
                kind = %err.kind,
                detail = ?err.detail,
                "remote logout failed, local session already cleared"
            );
        }
    }

    /// Changes the password of the signed-in actor. The session is never
    /// modified, whatever the outcome.
    ///
    /// # Errors
    /// Returns `BadRequest` for an empty field, `Unauthorized` without a
    /// session, or the classified failure.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        current: &SecretString,
        new: &SecretString,
    ) -> AuthResult<()> {
        match self.try_change_password(current, new).await {
            Ok(()) => {
                info!("password changed");
                self.notifier
                    .notify(Notification::success("Mot de passe modifié avec succès."));
                Ok(())
            }
            Err(err) => Err(self.report_failure("password change", err)),
        }
    }

    async fn try_change_password(
        &self,
        current: &SecretString,
        new: &SecretString,
    ) -> AuthResult<()> {
        if current.expose_secret().is_empty() || new.expose_secret().is_empty() {
            return Err(ApiError::new(ErrorKind::BadRequest)
                .with_message("Veuillez saisir l'ancien et le nouveau mot de passe."));
        }
        if !self.store.get().is_authenticated() {
            return Err(not_signed_in());
        }

        let request = ChangePasswordRequest {
            old_password: current.expose_secret(),
            new_password: new.expose_secret(),
        };
        client::change_password(&self.api, &request, Bearer::Session(&self.store)).await?;

        Ok(())
    }

    /// Startup rehydration. Without a persisted record the session becomes
    /// an empty `Ready` session and nothing is sent. Otherwise the profile
    /// is fetched with the persisted access token. The session is `Ready`
    /// afterwards in every case.
    ///
    /// On failure the session always ends unauthenticated in memory, but the
    /// durable record is only purged when the server rejects the credential
    /// (401/403). A network failure or a 5xx keeps the record so the next
    /// start can try again with it.
    ///
    /// # Errors
    /// Returns the failure that prevented the rehydration.
    #[instrument(skip(self))]
    pub async fn check_auth_status(&self) -> AuthResult<Role> {
        let ticket = self.store.generation();

        let result = match self.store.load_persisted() {
            None => {
                debug!("no persisted session");
                if self.store.get().is_authenticated() {
                    self.discard_memory(ticket);
                }
                Ok(Role::None)
            }
            Some(persisted) => self.rehydrate(ticket, persisted.credential().clone()).await,
        };

        self.store.mark_ready();
        result
    }

    /// Re-fetches role, permissions and profile after a profile-mutating
    /// action. Falls back to [`AuthController::check_auth_status`] when no
    /// identity is loaded.
    ///
    /// # Errors
    /// Same failure policy as rehydration.
    #[instrument(skip(self))]
    pub async fn refresh_user_data(&self) -> AuthResult<Role> {
        let ticket = self.store.generation();
        let Some(credential) = self.store.get().credential().cloned() else {
            return self.check_auth_status().await;
        };

        self.rehydrate(ticket, credential).await
    }

    async fn rehydrate(&self, ticket: Generation, credential: CredentialPair) -> AuthResult<Role> {
        let account = profile::load_profile(&self.api, Bearer::Token(credential.access_token())).await;
        let identity = account.and_then(|account| account.into_identity(credential));

        match identity {
            Ok(identity) => {
                let role = identity.role();
                match self.store.restore(ticket, identity) {
                    Ok(true) => info!(role = %role, "session restored"),
                    Ok(false) => {
                        debug!("session changed during rehydration, keeping the newer one");
                        return Ok(self.store.get().role());
                    }
                    Err(err) => warn!("session restored but not persisted: {err}"),
                }
                Ok(role)
            }
            Err(err) => {
                self.discard_after_failure(ticket, &err);
                Err(err)
            }
        }
    }

    /// Rehydration failure policy: a rejected credential is purged silently;
    /// any other failure only clears memory and is reported.
    fn discard_after_failure(&self, ticket: Generation, err: &ApiError) {
        if err.kind.rejects_credential() {
            info!(kind = %err.kind, "persisted credential rejected, signing out");
            match self.store.clear_if_current(ticket) {
                Ok(true) => {}
                Ok(false) => debug!("session changed during rehydration, failure ignored"),
                Err(store_err) => warn!("failed to purge session record: {store_err}"),
            }
            return;
        }

        warn!(
            kind = %err.kind,
            status = ?err.status,
            detail = ?err.detail,
            "could not restore session"
        );
        if self.discard_memory(ticket) {
            self.notifier.notify(Notification::error(err.message.clone()));
        }
    }

    fn discard_memory(&self, ticket: Generation) -> bool {
        match self
            .store
            .set_if_current(ticket, SessionPatch::new().anonymous())
        {
            Ok(applied) => applied,
            Err(err) => {
                warn!("failed to clear session: {err}");
                false
            }
        }
    }

    /// Exchanges the refresh token for a new pair and replaces both tokens
    /// at once, in memory and in the durable record. A rejected refresh
    /// token ends the session.
    ///
    /// # Errors
    /// Returns `Unauthorized` without a session, or the classified failure.
    #[instrument(skip(self))]
    pub async fn refresh_tokens(&self) -> AuthResult<()> {
        match self.try_refresh_tokens().await {
            Ok(()) => {
                debug!("credential pair rotated");
                Ok(())
            }
            Err(err) => Err(self.report_failure("token refresh", err)),
        }
    }

    async fn try_refresh_tokens(&self) -> AuthResult<()> {
        let ticket = self.store.generation();
        let Some(current) = self.store.get().credential().cloned() else {
            return Err(not_signed_in());
        };

        let request = RefreshRequest {
            refresh: current.refresh_token().expose_secret(),
        };
        let tokens = match client::refresh(&self.api, &request).await {
            Ok(tokens) => tokens,
            Err(err) => {
                let err = ApiError::from(err);
                if err.kind == ErrorKind::Unauthorized {
                    info!("refresh token rejected, signing out");
                    if let Err(store_err) = self.store.clear_if_current(ticket) {
                        warn!("failed to purge session record: {store_err}");
                    }
                }
                return Err(err);
            }
        };
        let credential = profile::credential_from(tokens)?;

        match self
            .store
            .commit_if_current(ticket, SessionPatch::new().credential(credential))
        {
            Ok(true) => Ok(()),
            Ok(false) => Err(session_changed()),
            Err(err) => {
                warn!("rotated credential not persisted: {err}");
                Ok(())
            }
        }
    }

    /// Logs and notifies a failed operation, handing the error back.
    fn report_failure(&self, operation: &str, err: ApiError) -> ApiError {
        warn!(
            kind = %err.kind,
            status = ?err.status,
            detail = ?err.detail,
            "{operation} failed"
        );
        self.notifier.notify(Notification::error(err.message.clone()));
        err
    }
}

fn session_changed() -> ApiError {
    ApiError::new(ErrorKind::Unknown)
        .with_message("La session a changé pendant l'opération. Veuillez réessayer.")
}

fn not_signed_in() -> ApiError {
    ApiError::new(ErrorKind::Unauthorized).with_message("Vous n'êtes pas connecté.")
}
