//! Accounts service models

pub mod forms;
pub mod session;
pub mod user;

// Re-export for convenience
pub use forms::{CredentialsForm, Patch, UpdateForm, UsernameForm};
pub use session::Session;
pub use user::{NewUser, User, UserChanges};
