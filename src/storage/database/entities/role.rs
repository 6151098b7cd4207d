use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    /// Role ID
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Role name (unique)
    #[sea_orm(unique)]
    pub name: String,

    /// Human-readable description
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// User-role association rows
    #[sea_orm(has_many = "super::user_role::Entity")]
    UserRoles,

    /// Role-permission association rows
    #[sea_orm(has_many = "super::role_permission::Entity")]
    RolePermissions,
}

impl Related<super::user_role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserRoles.def()
    }
}

impl Related<super::role_permission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RolePermissions.def()
    }
}

impl Related<super::permission::Entity> for Entity {
    fn to() -> RelationDef {
        super::role_permission::Relation::Permission.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::role_permission::Relation::Role.def().rev())
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_role::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_role::Relation::Role.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain role model with its loaded permissions
    pub fn to_domain(
        &self,
        permissions: Vec<crate::core::models::Permission>,
    ) -> crate::core::models::Role {
        crate::core::models::Role {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            permissions,
        }
    }
}
