//! User repository

use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use tracing::info;

use crate::db::{format_ts, parse_ts};
use crate::error::{Result, insert_conflict};
use crate::models::User;

/// User repository
pub struct UserRepo<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepo<'a> {
    /// Create a new user repository
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a new user; phone numbers and referral codes are unique
    pub async fn create(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, phone_number, password_hash, referral_code, referred_by, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.phone_number)
        .bind(&user.password_hash)
        .bind(&user.referral_code)
        .bind(&user.referred_by)
        .bind(format_ts(user.created_at))
        .execute(self.pool)
        .await
        .map_err(|e| insert_conflict(e, "user", &user.phone_number))?;

        info!(user_id = %user.id, "user created");
        Ok(())
    }

    /// Get a user by phone number
    pub async fn get_by_phone(&self, phone_number: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE phone_number = ?")
            .bind(phone_number)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    /// Get a user by id
    pub async fn get_by_id(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    /// Get the user who owns a referral code
    pub async fn get_by_referral_code(&self, code: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE referral_code = ?")
            .bind(code)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    /// Replace a user's password hash; false when the phone is unknown
    pub async fn set_password_hash(&self, phone_number: &str, hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE phone_number = ?")
            .bind(hash)
            .bind(phone_number)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of registered users
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }

    fn row_to_user(row: &SqliteRow) -> Result<User> {
        let created_at: String = row.get("created_at");
        Ok(User {
            id: row.get("id"),
            phone_number: row.get("phone_number"),
            password_hash: row.get("password_hash"),
            referral_code: row.get("referral_code"),
            referred_by: row.get("referred_by"),
            created_at: parse_ts(&created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;
    use crate::error::StoreError;

    #[tokio::test]
    async fn test_user_crud() {
        let store = Store::new_memory().await.unwrap();
        let repo = store.users();

        let user = User::new("09123456789", "AB12CD");
        repo.create(&user).await.unwrap();

        let fetched = repo.get_by_phone("09123456789").await.unwrap().unwrap();
        assert_eq!(fetched.id, user.id);
        assert!(fetched.password_hash.is_none());

        assert!(repo.set_password_hash("09123456789", "$argon2id$x").await.unwrap());
        assert!(!repo.set_password_hash("09000000000", "$argon2id$x").await.unwrap());
        let fetched = repo.get_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(fetched.password_hash.as_deref(), Some("$argon2id$x"));
        assert_eq!(repo.count().await.unwrap(), 1);

        let friend = User::new("09120000000", "ZZ99ZZ").referred_by(&user.id);
        repo.create(&friend).await.unwrap();
        let owner = repo.get_by_referral_code("AB12CD").await.unwrap().unwrap();
        assert_eq!(owner.id, user.id);
        let fetched = repo.get_by_phone("09120000000").await.unwrap().unwrap();
        assert_eq!(fetched.referred_by.as_deref(), Some(user.id.as_str()));
    }

    #[tokio::test]
    async fn test_duplicate_phone_rejected() {
        let store = Store::new_memory().await.unwrap();
        let repo = store.users();

        repo.create(&User::new("09123456789", "AAAAAA")).await.unwrap();
        let err = repo
            .create(&User::new("09123456789", "BBBBBB"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists { entity: "user", .. }));
    }
}
