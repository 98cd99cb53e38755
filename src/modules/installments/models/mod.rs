pub mod installment;

pub use installment::{Installment, ScheduledPayment};
