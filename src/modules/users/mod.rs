pub mod models;
pub mod repositories;

pub use models::{NewUser, User};
pub use repositories::UserRepository;
