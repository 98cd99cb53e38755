pub mod installment_repository;

pub use installment_repository::InstallmentRepository;
