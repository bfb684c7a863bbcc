pub mod loan_application;

pub use loan_application::LoanApplication;
