//! SeaORM entities for the relational layout
//!
//! Five tables: `users`, `roles`, `permissions`, plus the `user_roles` and
//! `role_permissions` association tables backing the two many-to-many
//! relationships.

pub mod permission;
pub mod role;
pub mod role_permission;
pub mod user;
pub mod user_role;

pub use permission::Entity as Permissions;
pub use role::Entity as Roles;
pub use role_permission::Entity as RolePermissions;
pub use user::Entity as Users;
pub use user_role::Entity as UserRoles;
