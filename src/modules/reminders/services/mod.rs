pub mod notifier;
pub mod reminder_service;

pub use notifier::{LogNotifier, Notifier};
pub use reminder_service::{ReminderNotice, ReminderService};
