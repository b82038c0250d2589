//! Authentication system for session-booking
//!
//! This module provides the authentication pipeline:
//! - Password hashing
//! - Token issuance and verification
//! - Principal resolution through the user repository
//! - The per-request authentication gate and security context
//! - Credential checks for login

pub mod context;
pub mod gate;
pub mod manager;
pub mod password;
pub mod principal;
pub mod token;

pub use context::SecurityContext;
pub use gate::{AuthenticationGate, GateOutcome, BEARER_PREFIX};
pub use manager::{Authenticator, CredentialsAuthenticator};
pub use password::{hash_password, verify_password};
pub use principal::{AuthenticatedUser, Principal, PrincipalStore, ResolveError};
pub use token::{Claims, TokenCodec};
