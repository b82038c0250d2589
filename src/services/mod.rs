//! Business logic sitting between the HTTP handlers and the repository

pub mod account;
pub mod enrollment;
pub mod session;

pub use account::AccountService;
pub use enrollment::EnrollmentService;
pub use session::SessionService;
