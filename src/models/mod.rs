//! Domain models for session-booking
//!
//! This module contains the domain records, their API wire shapes, and the
//! request/response bodies used by the HTTP layer.

pub mod payload;
pub mod session;
pub mod teacher;
pub mod user;

// Re-export commonly used types
pub use payload::{
    JwtResponse, LoginRequest, MessageResponse, SignupRequest, Validate, ValidationError,
};
pub use session::{Session, SessionDto};
pub use teacher::{Teacher, TeacherDto};
pub use user::{User, UserDto};
