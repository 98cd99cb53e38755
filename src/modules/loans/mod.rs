pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Loan, LoanStatus, LoanTerms, NewLoan, PaymentCycle};
pub use repositories::LoanRepository;
pub use services::{LoanOverview, LoanService};
