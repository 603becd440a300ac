use crate::domain::models::contact::ContactMessage;
use crate::domain::ports::ContactRepository;
use crate::domain::services::pagination::PageRequest;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteContactRepo {
    pool: SqlitePool,
}

impl SqliteContactRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepository for SqliteContactRepo {
    async fn create(&self, m: &ContactMessage) -> Result<ContactMessage, AppError> {
        sqlx::query_as::<_, ContactMessage>(
            "INSERT INTO contact_messages (id, name, email, subject, message, created_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING *"
        )
            .bind(&m.id).bind(&m.name).bind(&m.email).bind(&m.subject).bind(&m.message).bind(m.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, page: &PageRequest) -> Result<(Vec<ContactMessage>, i64), AppError> {
        let total = self.count().await?;
        let messages = sqlx::query_as::<_, ContactMessage>("SELECT * FROM contact_messages ORDER BY created_at DESC LIMIT ? OFFSET ?")
            .bind(page.limit()).bind(page.offset())
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        Ok((messages, total))
    }

    async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages").fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
