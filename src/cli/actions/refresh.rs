use super::run::failed;
use crate::auth::AuthController;
use anyhow::Result;
use tracing::info;

#[derive(Debug)]
pub struct Args {
    /// Reload role, permissions and profile instead of rotating tokens.
    pub profile: bool,
}

/// # Errors
/// Returns an error if the refresh fails.
pub async fn execute(controller: &AuthController, args: Args) -> Result<()> {
    if args.profile {
        let role = controller
            .refresh_user_data()
            .await
            .map_err(failed("profile refresh"))?;
        info!(role = %role, "profile reloaded");
    } else {
        controller
            .refresh_tokens()
            .await
            .map_err(failed("token refresh"))?;
        info!("tokens rotated");
    }

    Ok(())
}
