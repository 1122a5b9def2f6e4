use super::util::{is_dup_key, store_err};
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

const USER_COLUMNS: &str =
    "user_id, username, password_hash, nickname, email, phone, created_at, updated_at";

pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }

    fn row_to_record(row: MySqlRow) -> Result<UserRecord, StoreError> {
        let decode = store_err("decode user row");
        Ok(UserRecord {
            user_id: row.try_get("user_id").map_err(&decode)?,
            username: row.try_get("username").map_err(&decode)?,
            password_hash: row.try_get("password_hash").map_err(&decode)?,
            nickname: row.try_get("nickname").map_err(&decode)?,
            email: row.try_get("email").map_err(&decode)?,
            phone: row.try_get("phone").map_err(&decode)?,
            created_at: row.try_get("created_at").map_err(&decode)?,
            updated_at: row.try_get("updated_at").map_err(&decode)?,
        })
    }
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn create(&self, user: &UserRecord) -> Result<(), StoreError> {
        let res = sqlx::query(
            r#"
INSERT INTO user (user_id, username, password_hash, nickname, email, phone, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(&user.user_id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.nickname)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(e) if is_dup_key(&e) => Err(StoreError::Duplicate(user.username.clone())),
            Err(e) => Err(StoreError::Backend(format!("insert user: {e}"))),
        }
    }

    async fn get_by_id(&self, user_id: &UserId) -> Result<Option<UserRecord>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM user WHERE user_id = ?");
        sqlx::query(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err("query user by id"))?
            .map(Self::row_to_record)
            .transpose()
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM user WHERE username = ?");
        sqlx::query(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err("query user by username"))?
            .map(Self::row_to_record)
            .transpose()
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        patch: &ProfilePatch,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
UPDATE user
SET nickname = COALESCE(?, nickname),
    email = COALESCE(?, email),
    phone = COALESCE(?, phone),
    updated_at = ?
WHERE user_id = ?
"#,
        )
        .bind(&patch.nickname)
        .bind(&patch.email)
        .bind(&patch.phone)
        .bind(updated_at)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(store_err("update profile"))?;

        Ok(())
    }

    async fn update_password(
        &self,
        user_id: &UserId,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE user SET password_hash = ?, updated_at = ? WHERE user_id = ?")
            .bind(password_hash)
            .bind(updated_at)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(store_err("update password"))?;

        Ok(())
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM user WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(store_err("delete user"))?;

        Ok(())
    }

    async fn list(&self, page: Page) -> Result<(Vec<UserRecord>, i64), StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user")
            .fetch_one(&self.pool)
            .await
            .map_err(store_err("count users"))?;

        let sql = format!(
            "SELECT {USER_COLUMNS} FROM user ORDER BY created_at ASC, user_id ASC LIMIT ? OFFSET ?"
        );
        let users = sqlx::query(&sql)
            .bind(page.page_size())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(store_err("list users"))?
            .into_iter()
            .map(Self::row_to_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((users, total))
    }
}
