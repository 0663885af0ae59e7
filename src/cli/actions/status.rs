use crate::{
    auth::AuthController,
    session::{Profile, Session, SessionStatus},
};
use anyhow::{bail, Result};
use std::fmt::Write as _;

/// Prints the whole session.
/// # Errors
/// Never fails once the session is loaded.
pub fn status(controller: &AuthController) -> Result<()> {
    print!("{}", describe(&controller.session()));
    Ok(())
}

/// Prints the signed-in actor.
/// # Errors
/// Returns an error when nobody is signed in.
pub fn whoami(controller: &AuthController) -> Result<()> {
    let session = controller.session();
    let Some(profile) = session.profile() else {
        bail!("not signed in");
    };

    println!(
        "{} <{}> ({})",
        profile.display_name(),
        profile.email(),
        session.role()
    );
    Ok(())
}

fn describe(session: &Session) -> String {
    let mut out = String::new();
    let status = match session.status() {
        SessionStatus::Loading => "loading",
        SessionStatus::Ready => "ready",
    };
    let _ = writeln!(out, "status: {status}");
    let _ = writeln!(out, "role: {}", session.role());

    let Some(profile) = session.profile() else {
        return out;
    };

    let _ = writeln!(out, "id: {}", profile.id());
    let _ = writeln!(out, "name: {}", profile.display_name());
    let _ = writeln!(out, "email: {}", profile.email());
    if let Profile::Partner(partner) = profile {
        let _ = writeln!(out, "affiliation code: {}", partner.affiliation_code);
        let _ = writeln!(out, "bonus per referral: {}", partner.bonus_per_referral);
    }

    let permissions = session
        .permissions()
        .map(|set| set.iter().collect::<Vec<_>>().join(", "))
        .unwrap_or_default();
    let _ = writeln!(out, "permissions: {permissions}");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{
        types::fixtures::{admin_identity, partner_identity},
        Role, SessionPatch, SessionStore,
    };
    use anyhow::Result;

    #[test]
    fn test_describe_anonymous() {
        let store = SessionStore::in_memory();
        store.mark_ready();
        assert_eq!(describe(&store.get()), "status: ready\nrole: none\n");
    }

    #[test]
    fn test_describe_partner() -> Result<()> {
        let store = SessionStore::in_memory();
        store.mark_ready();
        store.set(SessionPatch::new().identity(partner_identity()))?;

        let text = describe(&store.get());
        assert!(text.contains("role: influenceur\n"));
        assert!(text.contains("name: Inès Durand\n"));
        assert!(text.contains("affiliation code: INES2024\n"));
        assert!(text.contains("bonus per referral: 15.00\n"));
        assert!(text.contains("permissions: referrals.view\n"));
        Ok(())
    }

    #[test]
    fn test_describe_admin_has_no_partner_fields() -> Result<()> {
        let store = SessionStore::in_memory();
        store.set(SessionPatch::new().identity(admin_identity(Role::SuperAdmin)))?;

        let text = describe(&store.get());
        assert!(text.starts_with("status: loading\nrole: superadmin\n"));
        assert!(!text.contains("affiliation code"));
        assert!(text.contains("permissions: partners.manage, remises.pay\n"));
        Ok(())
    }
}
