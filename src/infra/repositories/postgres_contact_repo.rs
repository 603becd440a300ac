use crate::domain::models::contact::ContactMessage;
use crate::domain::ports::ContactRepository;
use crate::domain::services::pagination::PageRequest;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresContactRepo {
    pool: PgPool,
}

impl PostgresContactRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactRepository for PostgresContactRepo {
    async fn create(&self, m: &ContactMessage) -> Result<ContactMessage, AppError> {
        sqlx::query_as::<_, ContactMessage>(
            "INSERT INTO contact_messages (id, name, email, subject, message, created_at) VALUES ($1, $2, $3, $4, $5, $6) RETURNING *"
        )
            .bind(&m.id).bind(&m.name).bind(&m.email).bind(&m.subject).bind(&m.message).bind(m.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, page: &PageRequest) -> Result<(Vec<ContactMessage>, i64), AppError> {
        let total = self.count().await?;
        let messages = sqlx::query_as::<_, ContactMessage>("SELECT * FROM contact_messages ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(page.limit()).bind(page.offset())
            .fetch_all(&self.pool).await.map_err(AppError::Database)?;
        Ok((messages, total))
    }

    async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages").fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
