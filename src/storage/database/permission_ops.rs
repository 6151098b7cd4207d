//! Permission persistence operations

use super::entities::{self, permission, role_permission};
use super::{map_unique_violation, Database};
use crate::core::models::Permission;
use crate::utils::error::{CmsError, Result};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use tracing::debug;

impl Database {
    /// Create a permission; duplicate names are rejected with a conflict
    pub async fn create_permission(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<Permission> {
        debug!("Creating permission: {}", name);

        let model = permission::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.map(|s| s.to_string())),
            ..Default::default()
        };

        let created = model
            .insert(self.conn())
            .await
            .map_err(|e| map_unique_violation(e, "Permission name already exists"))?;

        Ok(created.to_domain())
    }

    /// Find a permission by name
    pub async fn find_permission_by_name(&self, name: &str) -> Result<Option<Permission>> {
        Ok(self
            .find_permission_model_by_name(name)
            .await?
            .map(|m| m.to_domain()))
    }

    /// List all permissions
    pub async fn list_permissions(&self) -> Result<Vec<Permission>> {
        let models = entities::Permissions::find()
            .all(self.conn())
            .await
            .map_err(CmsError::Database)?;
        Ok(models.iter().map(|m| m.to_domain()).collect())
    }

    /// Delete a permission.
    ///
    /// Same policy as role deletion: forbidden while any role still
    /// references the permission.
    pub async fn delete_permission(&self, permission_id: i32) -> Result<()> {
        let referencing_roles = entities::RolePermissions::find()
            .filter(role_permission::Column::PermissionId.eq(permission_id))
            .count(self.conn())
            .await
            .map_err(CmsError::Database)?;

        if referencing_roles > 0 {
            return Err(CmsError::conflict(format!(
                "Permission is still granted by {} role(s)",
                referencing_roles
            )));
        }

        let result = entities::Permissions::delete_by_id(permission_id)
            .exec(self.conn())
            .await
            .map_err(CmsError::Database)?;

        if result.rows_affected == 0 {
            return Err(CmsError::not_found("Permission not found"));
        }
        Ok(())
    }

    pub(crate) async fn find_permission_model_by_name(
        &self,
        name: &str,
    ) -> Result<Option<permission::Model>> {
        entities::Permissions::find()
            .filter(permission::Column::Name.eq(name))
            .one(self.conn())
            .await
            .map_err(CmsError::Database)
    }
}
