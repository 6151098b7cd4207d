//! User persistence operations

use super::entities::{self, user, user_role};
use super::{map_unique_violation, Database};
use crate::core::models::User;
use crate::utils::error::{CmsError, Result};
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, ModelTrait, QueryFilter, Set,
};
use tracing::debug;
use uuid::Uuid;

impl Database {
    /// Insert the base user record. The username is not part of this write;
    /// the post-registration hook attaches it afterwards (see
    /// [`Database::attach_username`]).
    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        active: bool,
    ) -> Result<User> {
        debug!("Creating user: {}", email);

        let now = Utc::now();
        let model = user::ActiveModel {
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            active: Set(active),
            // Assigned once here; never changed for the lifetime of the row
            uniquifier: Set(Uuid::new_v4().simple().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            login_count: Set(0),
            ..Default::default()
        };

        let created = model
            .insert(self.conn())
            .await
            .map_err(|e| map_unique_violation(e, "Email already exists"))?;

        Ok(created.to_domain(vec![]))
    }

    /// Follow-up write that persists the username captured by the
    /// registration form onto an already-created user record.
    pub async fn attach_username(&self, user_id: i32, username: &str) -> Result<()> {
        debug!("Attaching username {} to user {}", username, user_id);

        let mut model: user::ActiveModel = self
            .find_user_model(user_id)
            .await?
            .ok_or_else(|| CmsError::not_found("User not found"))?
            .into();

        model.username = Set(Some(username.to_string()));
        model.updated_at = Set(Utc::now());
        model
            .update(self.conn())
            .await
            .map_err(|e| map_unique_violation(e, "Username already exists"))?;

        Ok(())
    }

    /// Find a user by ID, with roles and permissions loaded
    pub async fn find_user_by_id(&self, user_id: i32) -> Result<Option<User>> {
        match self.find_user_model(user_id).await? {
            Some(model) => Ok(Some(self.into_domain_user(model).await?)),
            None => Ok(None),
        }
    }

    /// Find a user by email, with roles and permissions loaded
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        debug!("Finding user by email: {}", email);

        let model = entities::Users::find()
            .filter(user::Column::Email.eq(email))
            .one(self.conn())
            .await
            .map_err(CmsError::Database)?;

        match model {
            Some(model) => Ok(Some(self.into_domain_user(model).await?)),
            None => Ok(None),
        }
    }

    /// Find a user by username, with roles and permissions loaded
    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        debug!("Finding user by username: {}", username);

        let model = entities::Users::find()
            .filter(user::Column::Username.eq(username))
            .one(self.conn())
            .await
            .map_err(CmsError::Database)?;

        match model {
            Some(model) => Ok(Some(self.into_domain_user(model).await?)),
            None => Ok(None),
        }
    }

    /// List all users, with roles and permissions loaded
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let models = entities::Users::find()
            .all(self.conn())
            .await
            .map_err(CmsError::Database)?;

        let mut users = Vec::with_capacity(models.len());
        for model in models {
            users.push(self.into_domain_user(model).await?);
        }
        Ok(users)
    }

    /// Update a user's password hash
    pub async fn update_user_password(&self, user_id: i32, password_hash: &str) -> Result<()> {
        let mut model: user::ActiveModel = self
            .find_user_model(user_id)
            .await?
            .ok_or_else(|| CmsError::not_found("User not found"))?
            .into();

        model.password_hash = Set(password_hash.to_string());
        model.updated_at = Set(Utc::now());
        model.update(self.conn()).await.map_err(CmsError::Database)?;
        Ok(())
    }

    /// Activate or deactivate a user account
    pub async fn set_user_active(&self, user_id: i32, active: bool) -> Result<()> {
        let mut model: user::ActiveModel = self
            .find_user_model(user_id)
            .await?
            .ok_or_else(|| CmsError::not_found("User not found"))?
            .into();

        model.active = Set(active);
        model.updated_at = Set(Utc::now());
        model.update(self.conn()).await.map_err(CmsError::Database)?;
        Ok(())
    }

    /// Record a successful login: shift the current login timestamp/origin
    /// into the last-login slots, stamp the new ones and bump the counter.
    pub async fn record_login(&self, user_id: i32, ip: Option<&str>) -> Result<()> {
        let model = self
            .find_user_model(user_id)
            .await?
            .ok_or_else(|| CmsError::not_found("User not found"))?;

        let previous_at = model.current_login_at;
        let previous_ip = model.current_login_ip.clone();
        let login_count = model.login_count;

        let mut active: user::ActiveModel = model.into();
        active.last_login_at = Set(previous_at);
        active.last_login_ip = Set(previous_ip);
        active.current_login_at = Set(Some(Utc::now()));
        active.current_login_ip = Set(ip.map(|s| s.to_string()));
        active.login_count = Set(login_count + 1);
        active.updated_at = Set(Utc::now());
        active.update(self.conn()).await.map_err(CmsError::Database)?;
        Ok(())
    }

    /// Grant a role to a user by role name; granting twice is a no-op
    pub async fn assign_role_to_user(&self, user_id: i32, role_name: &str) -> Result<()> {
        debug!("Assigning role {} to user {}", role_name, user_id);

        let role = self
            .find_role_model_by_name(role_name)
            .await?
            .ok_or_else(|| CmsError::not_found(format!("Role not found: {}", role_name)))?;

        let link = user_role::ActiveModel {
            user_id: Set(user_id),
            role_id: Set(role.id),
        };

        let insert = entities::UserRoles::insert(link)
            .on_conflict(
                OnConflict::columns([user_role::Column::UserId, user_role::Column::RoleId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec(self.conn())
            .await;

        match insert {
            Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
            Err(e) => Err(CmsError::Database(e)),
        }
    }

    /// Revoke a role from a user by role name
    pub async fn remove_role_from_user(&self, user_id: i32, role_name: &str) -> Result<()> {
        let role = self
            .find_role_model_by_name(role_name)
            .await?
            .ok_or_else(|| CmsError::not_found(format!("Role not found: {}", role_name)))?;

        entities::UserRoles::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .filter(user_role::Column::RoleId.eq(role.id))
            .exec(self.conn())
            .await
            .map_err(CmsError::Database)?;
        Ok(())
    }

    /// Replace a user's role set with the named roles.
    ///
    /// Every name is resolved before existing memberships are touched, so a
    /// request naming an unknown role fails without stripping the user.
    pub async fn set_user_roles(&self, user_id: i32, role_names: &[String]) -> Result<()> {
        let mut role_ids = Vec::with_capacity(role_names.len());
        for name in role_names {
            let role = self
                .find_role_model_by_name(name)
                .await?
                .ok_or_else(|| CmsError::not_found(format!("Role not found: {}", name)))?;
            role_ids.push(role.id);
        }

        entities::UserRoles::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .exec(self.conn())
            .await
            .map_err(CmsError::Database)?;

        for role_id in role_ids {
            let link = user_role::ActiveModel {
                user_id: Set(user_id),
                role_id: Set(role_id),
            };
            entities::UserRoles::insert(link)
                .exec(self.conn())
                .await
                .map_err(CmsError::Database)?;
        }
        Ok(())
    }

    /// Delete a user and its role memberships
    pub async fn delete_user(&self, user_id: i32) -> Result<()> {
        entities::UserRoles::delete_many()
            .filter(user_role::Column::UserId.eq(user_id))
            .exec(self.conn())
            .await
            .map_err(CmsError::Database)?;

        let result = entities::Users::delete_by_id(user_id)
            .exec(self.conn())
            .await
            .map_err(CmsError::Database)?;

        if result.rows_affected == 0 {
            return Err(CmsError::not_found("User not found"));
        }
        Ok(())
    }

    async fn find_user_model(&self, user_id: i32) -> Result<Option<user::Model>> {
        entities::Users::find_by_id(user_id)
            .one(self.conn())
            .await
            .map_err(CmsError::Database)
    }

    /// Load the user's roles (each with its permissions) and build the
    /// domain model the authorization evaluator works on.
    async fn into_domain_user(&self, model: user::Model) -> Result<User> {
        let role_models = model
            .find_related(entities::Roles)
            .all(self.conn())
            .await
            .map_err(CmsError::Database)?;

        let mut roles = Vec::with_capacity(role_models.len());
        for role_model in role_models {
            let permissions = role_model
                .find_related(entities::Permissions)
                .all(self.conn())
                .await
                .map_err(CmsError::Database)?
                .iter()
                .map(|p| p.to_domain())
                .collect();
            roles.push(role_model.to_domain(permissions));
        }

        Ok(model.to_domain(roles))
    }

    /// Rebuild the domain view of a user after membership changes
    pub async fn reload_user(&self, user: &User) -> Result<User> {
        self.find_user_by_id(user.id)
            .await?
            .ok_or_else(|| CmsError::not_found("User not found"))
    }
}
