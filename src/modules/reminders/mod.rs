pub mod services;

pub use services::{LogNotifier, Notifier, ReminderNotice, ReminderService};
