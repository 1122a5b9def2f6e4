use super::util::{is_dup_key, store_err};
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

const POST_COLUMNS: &str = "post_id, owner_id, title, content, created_at, updated_at";

pub struct MySqlPostRepo {
    pool: MySqlPool,
}

impl MySqlPostRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlPostRepo { pool }
    }

    fn row_to_record(row: MySqlRow) -> Result<PostRecord, StoreError> {
        let decode = store_err("decode post row");
        Ok(PostRecord {
            post_id: row.try_get("post_id").map_err(&decode)?,
            owner_id: row.try_get("owner_id").map_err(&decode)?,
            title: row.try_get("title").map_err(&decode)?,
            content: row.try_get("content").map_err(&decode)?,
            created_at: row.try_get("created_at").map_err(&decode)?,
            updated_at: row.try_get("updated_at").map_err(&decode)?,
        })
    }

    fn rows_to_records(rows: Vec<MySqlRow>) -> Result<Vec<PostRecord>, StoreError> {
        rows.into_iter().map(Self::row_to_record).collect()
    }
}

#[async_trait::async_trait]
impl PostRepo for MySqlPostRepo {
    async fn create(&self, post: &PostRecord) -> Result<(), StoreError> {
        let res = sqlx::query(
            r#"
INSERT INTO post (post_id, owner_id, title, content, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?)
"#,
        )
        .bind(&post.post_id)
        .bind(&post.owner_id)
        .bind(&post.title)
        .bind(&post.content)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(e) if is_dup_key(&e) => Err(StoreError::Duplicate(post.post_id.to_string())),
            Err(e) => Err(StoreError::Backend(format!("insert post: {e}"))),
        }
    }

    async fn get_by_id(&self, post_id: &PostId) -> Result<Option<PostRecord>, StoreError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM post WHERE post_id = ?");
        sqlx::query(&sql)
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err("query post"))?
            .map(Self::row_to_record)
            .transpose()
    }

    async fn update_content(
        &self,
        post_id: &PostId,
        title: &str,
        content: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE post SET title = ?, content = ?, updated_at = ? WHERE post_id = ?")
            .bind(title)
            .bind(content)
            .bind(updated_at)
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(store_err("update post"))?;

        Ok(())
    }

    async fn delete(&self, post_id: &PostId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM post WHERE post_id = ?")
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(store_err("delete post"))?;

        Ok(())
    }

    async fn list(&self, page: Page) -> Result<(Vec<PostRecord>, i64), StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post")
            .fetch_one(&self.pool)
            .await
            .map_err(store_err("count posts"))?;

        let sql = format!(
            "SELECT {POST_COLUMNS} FROM post ORDER BY created_at DESC, post_id DESC LIMIT ? OFFSET ?"
        );
        let rows = sqlx::query(&sql)
            .bind(page.page_size())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(store_err("list posts"))?;

        Ok((Self::rows_to_records(rows)?, total))
    }

    async fn list_by_owner(
        &self,
        owner_id: &UserId,
        page: Page,
    ) -> Result<(Vec<PostRecord>, i64), StoreError> {
        let total = self.count_by_owner(owner_id).await?;

        let sql = format!(
            r#"
SELECT {POST_COLUMNS} FROM post
WHERE owner_id = ?
ORDER BY created_at DESC, post_id DESC
LIMIT ? OFFSET ?
"#
        );
        let rows = sqlx::query(&sql)
            .bind(owner_id)
            .bind(page.page_size())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(store_err("list posts by owner"))?;

        Ok((Self::rows_to_records(rows)?, total))
    }

    async fn count_by_owner(&self, owner_id: &UserId) -> Result<i64, StoreError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM post WHERE owner_id = ?")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await
            .map_err(store_err("count posts by owner"))
    }
}
