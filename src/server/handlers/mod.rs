//! Route handlers
//!
//! Handlers only marshal requests and responses; state transitions live in
//! the service layer.

pub mod auth;
pub mod session;
pub mod teacher;
pub mod user;
