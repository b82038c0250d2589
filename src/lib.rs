//! session-booking - Session booking backend with stateless bearer-token authentication
//!
//! Users register and log in for a signed token, then browse teachers and
//! sessions and enroll in the sessions they want to attend.

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod otel;
pub mod server;
pub mod services;
