use crate::domain::{models::activity::ActivityLog, ports::ActivityRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

pub struct PostgresActivityRepo {
    pool: PgPool,
}

impl PostgresActivityRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Shared by the repositories that log activity inside their own transaction.
pub(crate) async fn insert_activity(conn: &mut PgConnection, activity: &ActivityLog) -> Result<(), AppError> {
    sqlx::query("INSERT INTO activity_logs (id, student_id, action, details, created_at) VALUES ($1, $2, $3, $4, $5)")
        .bind(&activity.id).bind(&activity.student_id).bind(&activity.action).bind(&activity.details).bind(activity.created_at)
        .execute(conn).await.map_err(AppError::Database)?;
    Ok(())
}

#[async_trait]
impl ActivityRepository for PostgresActivityRepo {
    async fn record(&self, activity: &ActivityLog) -> Result<(), AppError> {
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;
        insert_activity(&mut conn, activity).await
    }

    async fn list_recent(&self, student_id: &str, limit: i64) -> Result<Vec<ActivityLog>, AppError> {
        sqlx::query_as::<_, ActivityLog>("SELECT * FROM activity_logs WHERE student_id = $1 ORDER BY created_at DESC LIMIT $2")
            .bind(student_id).bind(limit)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
