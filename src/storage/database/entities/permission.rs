use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Permission database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "permissions")]
pub struct Model {
    /// Permission ID
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Permission name (unique)
    #[sea_orm(unique)]
    pub name: String,

    /// Human-readable description
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Role-permission association rows
    #[sea_orm(has_many = "super::role_permission::Entity")]
    RolePermissions,
}

impl Related<super::role_permission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RolePermissions.def()
    }
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        super::role_permission::Relation::Role.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::role_permission::Relation::Permission.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain permission model
    pub fn to_domain(&self) -> crate::core::models::Permission {
        crate::core::models::Permission {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}
