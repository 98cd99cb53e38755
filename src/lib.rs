//! Vamyar: a Jalali-calendar personal loan tracker.
//!
//! The heart of the crate is the amortization scheduling engine: the Jalali
//! calendar bridge in [`core::jalali`] and the calculator in
//! [`modules::installments`]. Around it sit SQLite persistence for users,
//! loans and installments, a daily payment-reminder scan, and a
//! secondary-database backup job.

pub mod config;
pub mod core;
pub mod modules;

// Re-export commonly used types
pub use modules::backup;
pub use modules::installments;
pub use modules::loans;
pub use modules::reminders;
pub use modules::users;
