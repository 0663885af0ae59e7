//! Session state: the data model, the in-memory store, and the durable record
//! that survives restarts.

pub mod storage;
pub mod store;
pub mod types;

pub use storage::{FileStorage, MemoryStorage, SessionPersistence, StoreError};
pub use store::{Generation, SessionPatch, SessionStore};
pub use types::{
    AdminProfile, CredentialPair, Identity, IdentityError, PartnerProfile, PermissionSet, Profile,
    Role, Session, SessionStatus,
};
