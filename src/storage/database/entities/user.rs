use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// User ID
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Username (unique once set; nullable because the base registration
    /// write does not carry it, the post-registration hook fills it in)
    #[sea_orm(unique)]
    pub username: Option<String>,

    /// Email address (unique)
    #[sea_orm(unique)]
    pub email: String,

    /// Password hash
    pub password_hash: String,

    /// Whether the account is active
    pub active: bool,

    /// Stable identity token, assigned once and never changed
    #[sea_orm(unique)]
    pub uniquifier: String,

    /// Email confirmation timestamp
    pub confirmed_at: Option<DateTimeUtc>,

    /// Creation timestamp
    pub created_at: DateTimeUtc,

    /// Last update timestamp
    pub updated_at: DateTimeUtc,

    /// Previous login timestamp
    pub last_login_at: Option<DateTimeUtc>,

    /// Current login timestamp
    pub current_login_at: Option<DateTimeUtc>,

    /// Previous login origin
    pub last_login_ip: Option<String>,

    /// Current login origin
    pub current_login_ip: Option<String>,

    /// Number of logins
    pub login_count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// User-role association rows
    #[sea_orm(has_many = "super::user_role::Entity")]
    UserRoles,
}

impl Related<super::user_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRoles.def()
    }
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_role::Relation::Role.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_role::Relation::User.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain user model with its loaded roles
    pub fn to_domain(&self, roles: Vec<crate::core::models::Role>) -> crate::core::models::User {
        crate::core::models::User {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            password_hash: self.password_hash.clone(),
            active: self.active,
            uniquifier: self.uniquifier.clone(),
            confirmed_at: self.confirmed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
            last_login_at: self.last_login_at,
            current_login_at: self.current_login_at,
            last_login_ip: self.last_login_ip.clone(),
            current_login_ip: self.current_login_ip.clone(),
            login_count: self.login_count,
            roles,
        }
    }
}
