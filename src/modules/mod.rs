pub mod backup;
pub mod installments;
pub mod loans;
pub mod reminders;
pub mod users;
