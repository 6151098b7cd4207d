//! Role persistence operations

use super::entities::{self, role, role_permission, user_role};
use super::{map_unique_violation, Database};
use crate::core::models::Role;
use crate::utils::error::{CmsError, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, Set,
};
use tracing::debug;

impl Database {
    /// Create a role; duplicate names are rejected with a conflict
    pub async fn create_role(&self, name: &str, description: Option<&str>) -> Result<Role> {
        debug!("Creating role: {}", name);

        let model = role::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.map(|s| s.to_string())),
            ..Default::default()
        };

        let created = model
            .insert(self.conn())
            .await
            .map_err(|e| map_unique_violation(e, "Role name already exists"))?;

        Ok(created.to_domain(vec![]))
    }

    /// Find a role by name, with its permissions loaded
    pub async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>> {
        match self.find_role_model_by_name(name).await? {
            Some(model) => Ok(Some(self.into_domain_role(model).await?)),
            None => Ok(None),
        }
    }

    /// List all roles, with permissions loaded
    pub async fn list_roles(&self) -> Result<Vec<Role>> {
        let models = entities::Roles::find()
            .all(self.conn())
            .await
            .map_err(CmsError::Database)?;

        let mut roles = Vec::with_capacity(models.len());
        for model in models {
            roles.push(self.into_domain_role(model).await?);
        }
        Ok(roles)
    }

    /// Update a role's description
    pub async fn update_role_description(
        &self,
        role_id: i32,
        description: Option<&str>,
    ) -> Result<()> {
        let mut model: role::ActiveModel = entities::Roles::find_by_id(role_id)
            .one(self.conn())
            .await
            .map_err(CmsError::Database)?
            .ok_or_else(|| CmsError::not_found("Role not found"))?
            .into();

        model.description = Set(description.map(|s| s.to_string()));
        model.update(self.conn()).await.map_err(CmsError::Database)?;
        Ok(())
    }

    /// Replace a role's permission set with the named permissions.
    ///
    /// Every referenced permission must already exist; seeding guarantees
    /// the invariant that roles never point at missing permissions.
    pub async fn set_role_permissions(&self, role_id: i32, names: &[&str]) -> Result<()> {
        debug!("Setting {} permissions on role {}", names.len(), role_id);

        let mut permission_ids = Vec::with_capacity(names.len());
        for name in names {
            let permission = self
                .find_permission_model_by_name(name)
                .await?
                .ok_or_else(|| CmsError::not_found(format!("Permission not found: {}", name)))?;
            permission_ids.push(permission.id);
        }

        entities::RolePermissions::delete_many()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .exec(self.conn())
            .await
            .map_err(CmsError::Database)?;

        for permission_id in permission_ids {
            let link = role_permission::ActiveModel {
                role_id: Set(role_id),
                permission_id: Set(permission_id),
            };
            entities::RolePermissions::insert(link)
                .exec(self.conn())
                .await
                .map_err(CmsError::Database)?;
        }
        Ok(())
    }

    /// Delete a role.
    ///
    /// Policy: deletion is forbidden while any user still references the
    /// role (409), so authorization checks can never observe a dangling
    /// membership. The role's own permission associations are cleared as
    /// part of a successful delete.
    pub async fn delete_role(&self, role_id: i32) -> Result<()> {
        let referencing_users = entities::UserRoles::find()
            .filter(user_role::Column::RoleId.eq(role_id))
            .count(self.conn())
            .await
            .map_err(CmsError::Database)?;

        if referencing_users > 0 {
            return Err(CmsError::conflict(format!(
                "Role is still assigned to {} user(s)",
                referencing_users
            )));
        }

        entities::RolePermissions::delete_many()
            .filter(role_permission::Column::RoleId.eq(role_id))
            .exec(self.conn())
            .await
            .map_err(CmsError::Database)?;

        let result = entities::Roles::delete_by_id(role_id)
            .exec(self.conn())
            .await
            .map_err(CmsError::Database)?;

        if result.rows_affected == 0 {
            return Err(CmsError::not_found("Role not found"));
        }
        Ok(())
    }

    pub(crate) async fn find_role_model_by_name(&self, name: &str) -> Result<Option<role::Model>> {
        entities::Roles::find()
            .filter(role::Column::Name.eq(name))
            .one(self.conn())
            .await
            .map_err(CmsError::Database)
    }

    async fn into_domain_role(&self, model: role::Model) -> Result<Role> {
        let permissions = model
            .find_related(entities::Permissions)
            .all(self.conn())
            .await
            .map_err(CmsError::Database)?
            .iter()
            .map(|p| p.to_domain())
            .collect();
        Ok(model.to_domain(permissions))
    }
}
