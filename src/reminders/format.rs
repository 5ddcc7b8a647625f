/// Renders the notification body for a lead time. Supplied by the localization layer.
pub trait ReminderFormatter: Send + Sync {
    fn format_reminder_message(&self, lead_minutes: u32) -> String;
}

/// Plain English messages, used when no localized formatter is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishReminderFormatter;

impl ReminderFormatter for EnglishReminderFormatter {
    fn format_reminder_message(&self, lead_minutes: u32) -> String {
        if lead_minutes == 0 {
            return "Starting now".to_string();
        }

        let days = lead_minutes / 1440;
        let hours = (lead_minutes % 1440) / 60;
        let minutes = lead_minutes % 60;

        let mut parts = Vec::new();
        if days > 0 {
            parts.push(plural(days, "day"));
        }
        if hours > 0 {
            parts.push(plural(hours, "hour"));
        }
        if minutes > 0 {
            parts.push(plural(minutes, "minute"));
        }

        format!("Starts in {}", parts.join(" "))
    }
}

fn plural(count: u32, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}
