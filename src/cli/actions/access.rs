use crate::{
    auth::AuthController,
    guard::{GuardDecision, RouteTable},
};
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub path: String,
}

/// Prints what the front-end would do when navigating to `path`.
/// # Errors
/// Never fails.
pub fn execute(controller: &AuthController, args: &Args) -> Result<()> {
    let decision = RouteTable::default().decide(&controller.session(), &args.path);
    println!("{}", render(decision, &args.path));
    Ok(())
}

fn render(decision: GuardDecision, path: &str) -> String {
    match decision {
        GuardDecision::Pending => "pending".to_string(),
        GuardDecision::Render => format!("render {path}"),
        GuardDecision::Redirect(target) => format!("redirect {target}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::paths;

    #[test]
    fn test_render() {
        assert_eq!(render(GuardDecision::Pending, "/profile"), "pending");
        assert_eq!(
            render(GuardDecision::Render, "/admin/dashboard"),
            "render /admin/dashboard"
        );
        assert_eq!(
            render(GuardDecision::Redirect(paths::LOGIN), "/profile"),
            "redirect /login"
        );
    }
}
