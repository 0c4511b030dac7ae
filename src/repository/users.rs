//! Users repository (credential store)

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{User, UserCredentials},
};

const PUBLIC_COLUMNS: &str = "id, user_name, email";

/// Column values to write on a user update; `None` keeps the stored value
#[derive(Debug, Default)]
pub struct UserChanges<'a> {
    pub user_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub password_hash: Option<&'a str>,
}

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all users
    pub async fn list(&self) -> AppResult<Vec<User>> {
        let query = format!("SELECT {} FROM users ORDER BY id", PUBLIC_COLUMNS);
        let rows = sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        let query = format!("SELECT {} FROM users WHERE id = $1", PUBLIC_COLUMNS);
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Get user with password hash by email (login handle)
    pub async fn get_credentials_by_email(&self, email: &str) -> AppResult<Option<UserCredentials>> {
        let user = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, user_name, email, password FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND id != $2)",
            )
            .bind(email)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Create user with an already hashed password
    pub async fn create(
        &self,
        user_name: Option<&str>,
        email: &str,
        password_hash: &str,
    ) -> AppResult<User> {
        let query = format!(
            "INSERT INTO users (user_name, email, password) VALUES ($1, $2, $3) RETURNING {}",
            PUBLIC_COLUMNS
        );
        sqlx::query_as::<_, User>(&query)
            .bind(user_name)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::from_constraint(e, "Email already exists"))
    }

    /// Update user
    pub async fn update(&self, id: i32, changes: &UserChanges<'_>) -> AppResult<User> {
        let mut sets = Vec::new();
        let mut idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(changes.user_name, "user_name");
        add_field!(changes.email, "email");
        add_field!(changes.password_hash, "password");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE users SET {} WHERE id = ${} RETURNING {}",
            sets.join(", "),
            idx,
            PUBLIC_COLUMNS
        );

        let mut builder = sqlx::query_as::<_, User>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(changes.user_name);
        bind_field!(changes.email);
        bind_field!(changes.password_hash);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::from_constraint(e, "Email already exists"))?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Delete user
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use sqlx::PgPool;

    use super::*;

    #[sqlx::test]
    #[ignore = "needs a Postgres server at DATABASE_URL"]
    async fn test_email_lookup_ignores_case(pool: PgPool) {
        let users = UsersRepository::new(pool);
        let frodo = users
            .create(Some("frodo"), "Frodo@Shire.me", "$argon2id$stored")
            .await
            .unwrap();

        let credentials = users
            .get_credentials_by_email("frodo@shire.me")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(credentials.id, frodo.id);
        assert_eq!(credentials.password_hash, "$argon2id$stored");

        assert!(users.email_exists("FRODO@SHIRE.ME", None).await.unwrap());
        assert!(!users.email_exists("frodo@shire.me", Some(frodo.id)).await.unwrap());

        let duplicate = users.create(None, "frodo@shire.me", "x").await;
        assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    }

    #[sqlx::test]
    #[ignore = "needs a Postgres server at DATABASE_URL"]
    async fn test_partial_update_and_delete(pool: PgPool) {
        let users = UsersRepository::new(pool);
        let sam = users.create(Some("sam"), "sam@shire.me", "old").await.unwrap();

        let unchanged = users.update(sam.id, &UserChanges::default()).await.unwrap();
        assert_eq!(unchanged, sam);

        let renamed = users
            .update(
                sam.id,
                &UserChanges {
                    user_name: Some("samwise"),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(renamed.user_name.as_deref(), Some("samwise"));
        assert_eq!(renamed.email, "sam@shire.me");

        users.delete(sam.id).await.unwrap();
        assert!(matches!(users.delete(sam.id).await, Err(AppError::NotFound(_))));
        assert!(users.list().await.unwrap().is_empty());
    }
}
