//! Authentication and provisioning
//!
//! Home of the [`AuthSystem`]: password hashing, session tokens, login and
//! registration, plus the bootstrap provisioning of the permission/role
//! catalog and the initial administrator.

pub mod password;
pub mod provision;
mod registration;
mod session;
mod system;

pub use registration::RegistrationForm;
pub use session::{SessionClaims, SessionHandler};
pub use system::AuthSystem;
