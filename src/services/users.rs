//! User management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User},
    repository::{users::UserChanges, Repository},
};

use super::{auth::hash_password, optional_text, required_text};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    /// Register a new user; the password is stored hashed
    pub async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let data = &data.normalized();
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let email = required_text(data.email.as_deref(), "email")?;
        let password = data
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| AppError::Validation("The 'password' field is required".to_string()))?;
        let user_name = data.user_name.as_deref().map(str::trim).filter(|n| !n.is_empty());

        if self.repository.users.email_exists(&email, None).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let password_hash = hash_password(password)?;
        let user = self
            .repository
            .users
            .create(user_name, &email, &password_hash)
            .await?;
        tracing::info!(user_id = user.id, "User created");
        Ok(user)
    }

    /// Update an existing user; a new password is re-hashed
    pub async fn update(&self, id: i32, data: &UpdateUser) -> AppResult<User> {
        let data = &data.normalized();
        data.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        // Check if user exists
        self.repository.users.get_by_id(id).await?;

        let email = optional_text(data.email.as_deref(), "email")?;
        if let Some(ref email) = email {
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict("Email already exists".to_string()));
            }
        }

        let password_hash = match data.password.as_deref() {
            Some("") => {
                return Err(AppError::Validation("'password' must not be empty".to_string()))
            }
            Some(p) => Some(hash_password(p)?),
            None => None,
        };

        let changes = UserChanges {
            user_name: data.user_name.as_deref(),
            email: email.as_deref(),
            password_hash: password_hash.as_deref(),
        };
        let user = self.repository.users.update(id, &changes).await?;
        tracing::info!(user_id = id, "User updated");
        Ok(user)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.users.delete(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}
