pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Installment, ScheduledPayment};
pub use repositories::InstallmentRepository;
pub use services::{AmortizationCalculator, InstallmentService};
