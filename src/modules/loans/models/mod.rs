pub mod loan;

pub use loan::{Loan, LoanStatus, LoanTerms, NewLoan, PaymentCycle};
