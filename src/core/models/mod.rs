//! Domain models: permissions, roles and users
//!
//! These types carry the in-memory relationship data the authorization
//! evaluator works on. They are produced by the storage layer and are not
//! tied to any persistence concern themselves.

mod permission;
mod role;
mod user;

pub use permission::Permission;
pub use role::Role;
pub use user::User;
