//! User domain module.
//!
//! # Module Structure
//!
//! - `model`: User profile domain model
//! - `service`: User service trait and the built-in implementation
//!
//! # Usage
//!
//! ```ignore
//! use novelty_core::user::{UserProfile, UserService, DefaultUserService};
//! ```

mod model;
mod service;

// Re-export public API
pub use model::{DEFAULT_BIO, UserProfile};
pub use service::{DefaultUserService, UserService};
