//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Context: Read-only state shared by handlers
//! - Services: Command matching, issue search, message handling
//! - Errors: Domain-specific errors

pub mod context;
pub mod errors;
pub mod services;
