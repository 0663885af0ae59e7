//! The single holder of the current session.
//!
//! Writes are applied in call order under one lock and published to
//! subscribers through a `watch` channel. Signing an identity in or out
//! starts a new generation; profile reloads and token rotations stay within
//! the current one. Network-driven writers take a ticket with
//! [`SessionStore::generation`] before suspending and use the `*_if_current`
//! methods, which discard the write when a newer login or logout completed in
//! the meantime.

use super::{
    storage::{MemoryStorage, SessionPersistence, StoreError},
    types::{CredentialPair, Identity, PermissionSet, Profile, Session, SessionStatus},
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, warn};

/// Monotonic counter of sign-ins and sign-outs.
pub type Generation = u64;

#[derive(Clone, Debug, Default)]
enum IdentityChange {
    #[default]
    Keep,
    Set(Identity),
    /// Same actor reloaded: the current credential, if any, is kept.
    Restore(Identity),
    Clear,
}

/// Partial update merged atomically into the session.
#[derive(Clone, Debug, Default)]
#[must_use]
pub struct SessionPatch {
    status: Option<SessionStatus>,
    identity: IdentityChange,
    permissions: Option<PermissionSet>,
    profile: Option<Profile>,
    credential: Option<CredentialPair>,
}

impl SessionPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: SessionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn identity(mut self, identity: Identity) -> Self {
        self.identity = IdentityChange::Set(identity);
        self
    }

    /// Replaces role, permissions and profile with a freshly loaded
    /// identity without starting a new generation. The session's current
    /// credential wins over the one carried by `identity`.
    pub fn restore(mut self, identity: Identity) -> Self {
        self.identity = IdentityChange::Restore(identity);
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.identity = IdentityChange::Clear;
        self
    }

    pub fn permissions(mut self, permissions: PermissionSet) -> Self {
        self.permissions = Some(permissions);
        self
    }

    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Replaces the whole credential pair.
    pub fn credential(mut self, credential: CredentialPair) -> Self {
        self.credential = Some(credential);
        self
    }

    fn starts_generation(&self) -> bool {
        matches!(self.identity, IdentityChange::Set(_) | IdentityChange::Clear)
    }

    /// Applies the patch to a copy of `session`; the original is untouched on
    /// error so a rejected patch never half-applies.
    fn apply_to(self, session: &Session) -> Result<Session, StoreError> {
        let mut next = session.clone();

        match self.status {
            Some(SessionStatus::Loading) if session.status() == SessionStatus::Ready => {
                return Err(StoreError::Rejected(
                    "a ready session cannot return to loading".to_string(),
                ));
            }
            Some(status) => next.set_status(status),
            None => {}
        }

        match self.identity {
            IdentityChange::Keep => {}
            IdentityChange::Set(identity) => next.replace_identity(Some(identity)),
            IdentityChange::Restore(mut identity) => {
                if let Some(current) = session.credential() {
                    identity.set_credential(current.clone());
                }
                next.replace_identity(Some(identity));
            }
            IdentityChange::Clear => next.replace_identity(None),
        }

        if self.permissions.is_none() && self.profile.is_none() && self.credential.is_none() {
            return Ok(next);
        }

        let Some(identity) = next.identity_mut() else {
            return Err(StoreError::Rejected(
                "an anonymous session has no permissions, profile or credential".to_string(),
            ));
        };
        if let Some(profile) = self.profile {
            identity.set_profile(profile)?;
        }
        if let Some(permissions) = self.permissions {
            identity.set_permissions(permissions);
        }
        if let Some(credential) = self.credential {
            identity.set_credential(credential);
        }

        Ok(next)
    }
}

#[derive(Debug)]
struct State {
    session: Session,
    generation: Generation,
}

#[derive(Debug)]
pub struct SessionStore {
    state: Mutex<State>,
    updates: watch::Sender<Session>,
    persistence: Arc<dyn SessionPersistence>,
}

impl SessionStore {
    /// Creates an empty `Loading` session backed by `persistence`.
    #[must_use]
    pub fn new(persistence: Arc<dyn SessionPersistence>) -> Self {
        let (updates, _) = watch::channel(Session::default());
        Self {
            state: Mutex::new(State {
                session: Session::default(),
                generation: 0,
            }),
            updates,
            persistence,
        }
    }

    /// Store whose durable record lives only as long as the process.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Snapshot of the current session.
    #[must_use]
    pub fn get(&self) -> Session {
        self.lock().session.clone()
    }

    /// Ticket for fenced writes.
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.lock().generation
    }

    /// Receiver notified on every change; dropping it unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.updates.subscribe()
    }

    /// Merges `patch` into the in-memory session.
    ///
    /// # Errors
    /// Returns an error, leaving the session untouched, when the patch would
    /// break the session invariants.
    pub fn set(&self, patch: SessionPatch) -> Result<(), StoreError> {
        let mut state = self.lock();
        self.apply(&mut state, patch)
    }

    /// Merges `patch` into memory unless a newer sign-in or sign-out happened
    /// after `expected` was taken. The durable record is left alone. Returns
    /// whether the patch was applied.
    ///
    /// # Errors
    /// Returns an error when the patch is invalid.
    pub fn set_if_current(
        &self,
        expected: Generation,
        patch: SessionPatch,
    ) -> Result<bool, StoreError> {
        let mut state = self.lock();
        if !Self::is_current(&state, expected) {
            return Ok(false);
        }

        self.apply(&mut state, patch)?;
        Ok(true)
    }

    /// Like [`SessionStore::set_if_current`], then writes the resulting
    /// identity to the durable record (or removes the record when the session
    /// became anonymous).
    ///
    /// # Errors
    /// Returns an error when the patch is invalid or the medium fails; memory
    /// is updated even if the medium fails.
    pub fn commit_if_current(
        &self,
        expected: Generation,
        patch: SessionPatch,
    ) -> Result<bool, StoreError> {
        let mut state = self.lock();
        if !Self::is_current(&state, expected) {
            return Ok(false);
        }

        self.apply(&mut state, patch)?;
        match state.session.identity() {
            Some(identity) => self.persistence.save(identity)?,
            None => self.persistence.clear()?,
        }

        Ok(true)
    }

    /// Establishes `identity` and persists it, unless stale.
    ///
    /// # Errors
    /// See [`SessionStore::commit_if_current`].
    pub fn establish(&self, expected: Generation, identity: Identity) -> Result<bool, StoreError> {
        self.commit_if_current(expected, SessionPatch::new().identity(identity))
    }

    /// Reloads the signed-in identity and persists it, unless stale. Unlike
    /// [`SessionStore::establish`] this keeps the generation, so logins still
    /// in flight are not invalidated.
    ///
    /// # Errors
    /// See [`SessionStore::commit_if_current`].
    pub fn restore(&self, expected: Generation, identity: Identity) -> Result<bool, StoreError> {
        self.commit_if_current(expected, SessionPatch::new().restore(identity))
    }

    /// Clears memory and the durable record, unless stale.
    ///
    /// # Errors
    /// Returns an error when the durable record cannot be removed.
    pub fn clear_if_current(&self, expected: Generation) -> Result<bool, StoreError> {
        self.commit_if_current(expected, SessionPatch::new().anonymous())
    }

    /// Writes the durable record for `identity`.
    ///
    /// # Errors
    /// Returns an error when the medium fails.
    pub fn persist(&self, identity: &Identity) -> Result<(), StoreError> {
        let _state = self.lock();
        self.persistence.save(identity)
    }

    /// Reads the durable record. A record that cannot be decoded is removed
    /// and reported as absent.
    #[must_use]
    pub fn load_persisted(&self) -> Option<Identity> {
        let _state = self.lock();
        match self.persistence.load() {
            Ok(identity) => identity,
            Err(err) => {
                warn!("discarding unreadable session record: {err}");
                if let Err(err) = self.persistence.clear() {
                    warn!("failed to remove unreadable session record: {err}");
                }
                None
            }
        }
    }

    /// Clears the in-memory identity and removes the durable record.
    ///
    /// # Errors
    /// Returns an error when the durable record cannot be removed; memory is
    /// cleared regardless.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut state = self.lock();
        self.apply(&mut state, SessionPatch::new().anonymous())?;
        self.persistence.clear()
    }

    /// Moves the session out of `Loading`. Later calls are no-ops.
    pub fn mark_ready(&self) {
        let mut state = self.lock();
        if state.session.status() == SessionStatus::Ready {
            return;
        }
        // Ready is always accepted from Loading.
        let _ = self.apply(&mut state, SessionPatch::new().status(SessionStatus::Ready));
    }

    fn apply(&self, state: &mut State, patch: SessionPatch) -> Result<(), StoreError> {
        let bumps = patch.starts_generation();
        let next = patch.apply_to(&state.session)?;

        if bumps {
            state.generation += 1;
        }
        state.session = next;
        self.updates.send_replace(state.session.clone());

        Ok(())
    }

    fn is_current(state: &State, expected: Generation) -> bool {
        if state.generation == expected {
            return true;
        }
        debug!(
            "discarding stale session update (ticket {expected}, current {})",
            state.generation
        );
        false
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
