use crate::domain::{models::activity::ActivityLog, ports::ActivityRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};

pub struct SqliteActivityRepo {
    pool: SqlitePool,
}

impl SqliteActivityRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Shared by the repositories that log activity inside their own transaction.
pub(crate) async fn insert_activity(conn: &mut SqliteConnection, activity: &ActivityLog) -> Result<(), AppError> {
    sqlx::query("INSERT INTO activity_logs (id, student_id, action, details, created_at) VALUES (?, ?, ?, ?, ?)")
        .bind(&activity.id).bind(&activity.student_id).bind(&activity.action).bind(&activity.details).bind(activity.created_at)
        .execute(conn).await.map_err(AppError::Database)?;
    Ok(())
}

#[async_trait]
impl ActivityRepository for SqliteActivityRepo {
    async fn record(&self, activity: &ActivityLog) -> Result<(), AppError> {
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;
        insert_activity(&mut conn, activity).await
    }

    async fn list_recent(&self, student_id: &str, limit: i64) -> Result<Vec<ActivityLog>, AppError> {
        sqlx::query_as::<_, ActivityLog>("SELECT * FROM activity_logs WHERE student_id = ? ORDER BY created_at DESC LIMIT ?")
            .bind(student_id).bind(limit)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
