pub mod error;
pub mod jalali;
pub mod money;

pub use error::{AppError, Result};
pub use jalali::{DateError, JalaliDate};
