pub mod amortization_calculator;
pub mod installment_service;

pub use amortization_calculator::AmortizationCalculator;
pub use installment_service::InstallmentService;
