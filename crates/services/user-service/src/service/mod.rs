//! Service layer - user validation and persistence use cases.

mod user_service;

pub use user_service::{is_email_taken, UserManager, UserService};
