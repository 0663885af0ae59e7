//! Authentication: wire types, endpoint wrappers, the profile loader and the
//! controller that drives the session store.

mod client;
pub mod controller;
pub mod notify;
pub mod profile;
pub mod types;

pub use controller::{AuthController, AuthResult, LoginFlow};
pub use notify::{Notification, NotificationLevel, Notifier, RecordingNotifier, TracingNotifier};
pub use profile::{load_profile, LoadedAccount};
pub use types::{LoginCredentials, PartnerRegistration};
