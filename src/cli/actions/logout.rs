use crate::auth::AuthController;
use anyhow::Result;

/// Signs out. Never fails: the local session is always removed.
/// # Errors
/// Kept fallible for symmetry with the other actions.
pub async fn execute(controller: &AuthController) -> Result<()> {
    controller.logout().await;
    Ok(())
}
