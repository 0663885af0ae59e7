use crate::auth::{Notification, NotificationLevel, Notifier};

/// Prints notifications on stderr, one line each.
#[derive(Clone, Copy, Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        eprintln!("{}", render(&notification));
    }
}

fn render(notification: &Notification) -> String {
    let marker = match notification.level {
        NotificationLevel::Success => "✔",
        NotificationLevel::Error => "✖",
    };
    format!("{marker} {}", notification.message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        assert_eq!(
            render(&Notification::success("Vous avez été déconnecté.")),
            "✔ Vous avez été déconnecté."
        );
        assert_eq!(render(&Notification::error("Oups")), "✖ Oups");
    }
}
