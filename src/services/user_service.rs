use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{ServiceError, ServiceResult};
use crate::auth::{self, Role};
use crate::database::models::{ChangePassword, NewUser, UpdateUser, User, UserCredentials, ValidationErrors};
use crate::database::models::validation::is_acceptable_password;
use crate::database::tables::USER_ACCOUNTS;
use crate::database::{Page, Repository};
use crate::filter::FilterData;

/// Live account state consulted on every authenticated request
#[async_trait]
pub trait AccountLookup: Send + Sync {
    /// `None` once the account is deleted
    async fn current_account(&self, id: Uuid) -> ServiceResult<Option<User>>;
}

pub struct UserService {
    pool: PgPool,
    accounts: Repository<User>,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            accounts: Repository::new(&USER_ACCOUNTS, pool.clone()),
            pool,
        }
    }

    pub async fn list(&self, filter: FilterData) -> ServiceResult<Page<User>> {
        Ok(self.accounts.select_page(filter).await?)
    }

    pub async fn get(&self, id: Uuid) -> ServiceResult<User> {
        self.accounts
            .select_one(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", id)))
    }

    pub async fn find_by_email(&self, email: &str) -> ServiceResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM user_accounts WHERE lower(email) = lower($1) AND deleted_at IS NULL",
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Login lookup including the password hash
    pub async fn find_credentials(&self, email: &str) -> ServiceResult<Option<UserCredentials>> {
        let credentials = sqlx::query_as::<_, UserCredentials>(
            r#"
            SELECT u.id, u.name, u.email, r.name AS role, u.active, u.password_hash
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE lower(u.email) = lower($1) AND u.deleted_at IS NULL
            "#,
        )
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await?;
        Ok(credentials)
    }

    /// Create an account; returns the generated password when none was supplied
    pub async fn create(&self, input: NewUser) -> ServiceResult<(User, Option<String>)> {
        input.validate()?;

        let (password, generated) = match input.password.clone() {
            Some(password) => (password, None),
            None => {
                let temporary = auth::generate_temporary_password();
                (temporary.clone(), Some(temporary))
            }
        };
        let password_hash = auth::hash_password(&password)?;

        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role_id)
            VALUES ($1, $2, $3, $4, (SELECT id FROM roles WHERE name = $5))
            "#,
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(input.email.trim())
        .bind(&password_hash)
        .bind(input.role.as_str())
        .execute(&self.pool)
        .await?;

        info!(user_id = %id, role = %input.role, "Created user account");
        Ok((self.get(id).await?, generated))
    }

    pub async fn update(&self, id: Uuid, input: UpdateUser, acting_user: Uuid) -> ServiceResult<User> {
        input.validate()?;
        let current = self.get(id).await?;

        if id == acting_user {
            if input.active == Some(false) {
                return Err(ServiceError::Forbidden("You cannot deactivate your own account".into()));
            }
            if input.role.is_some_and(|role| role.as_str() != current.role) {
                return Err(ServiceError::Forbidden("You cannot change your own role".into()));
            }
        }

        let role = input.role.map(|r| r.as_str().to_string()).unwrap_or(current.role);
        sqlx::query(
            r#"
            UPDATE users
            SET name = $2,
                email = $3,
                role_id = (SELECT id FROM roles WHERE name = $4),
                active = $5,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(input.name.as_deref().map(str::trim).unwrap_or(&current.name))
        .bind(input.email.as_deref().map(str::trim).unwrap_or(&current.email))
        .bind(&role)
        .bind(input.active.unwrap_or(current.active))
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    pub async fn delete(&self, id: Uuid, acting_user: Uuid) -> ServiceResult<()> {
        if id == acting_user {
            return Err(ServiceError::Forbidden("You cannot delete your own account".into()));
        }
        let result = sqlx::query(
            "UPDATE users SET deleted_at = NOW(), active = FALSE, updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("User {} not found", id)));
        }
        info!(user_id = %id, "Deleted user account");
        Ok(())
    }

    pub async fn set_password(&self, id: Uuid, password: &str) -> ServiceResult<()> {
        if !is_acceptable_password(password) {
            return Err(ValidationErrors::single(
                "password",
                "Password must have at least 8 characters, a letter and a digit",
            )
            .into());
        }
        let password_hash = auth::hash_password(password)?;
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(&password_hash)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("User {} not found", id)));
        }
        Ok(())
    }

    /// Self-service change; the current password must match
    pub async fn change_password(&self, id: Uuid, input: ChangePassword) -> ServiceResult<()> {
        input.validate()?;
        let user = self.get(id).await?;
        let credentials = self
            .find_credentials(&user.email)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("User {} not found", id)))?;

        if !auth::verify_password(&input.current_password, &credentials.password_hash) {
            return Err(ValidationErrors::single("current_password", "Current password is incorrect").into());
        }
        self.set_password(id, &input.new_password).await
    }

    /// Replace the password with a generated one and return it for mailing
    pub async fn reset_password(&self, id: Uuid) -> ServiceResult<(User, String)> {
        let user = self.get(id).await?;
        let temporary = auth::generate_temporary_password();
        self.set_password(id, &temporary).await?;
        info!(user_id = %id, "Reset user password");
        Ok((user, temporary))
    }

    pub async fn touch_last_login(&self, id: Uuid) -> ServiceResult<()> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Accounts per role, used by the CLI to warn about a missing admin
    pub async fn count_with_role(&self, role: Role) -> ServiceResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_accounts WHERE role = $1 AND active AND deleted_at IS NULL",
        )
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

#[async_trait]
impl AccountLookup for UserService {
    async fn current_account(&self, id: Uuid) -> ServiceResult<Option<User>> {
        Ok(self.accounts.select_one(id).await?)
    }
}
