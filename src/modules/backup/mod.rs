pub mod services;

pub use services::{BackupService, BackupSummary};
