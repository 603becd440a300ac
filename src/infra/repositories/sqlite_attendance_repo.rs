use crate::domain::models::activity::ActivityLog;
use crate::domain::models::attendance::{Attendance, AttendanceWithEvent, AttendanceWithStudent};
use crate::domain::models::registration::ATTENDANCE_PRESENT;
use crate::domain::ports::AttendanceRepository;
use crate::domain::services::attendance::ALREADY_MARKED;
use crate::error::AppError;
use crate::infra::repositories::sqlite_activity_repo::insert_activity;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteAttendanceRepo {
    pool: SqlitePool,
}

impl SqliteAttendanceRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceRepository for SqliteAttendanceRepo {
    async fn mark(&self, a: &Attendance, activity: &ActivityLog) -> Result<Attendance, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let saved = sqlx::query_as::<_, Attendance>(
            "INSERT INTO attendance (id, event_id, student_id, qr_token, status, marked_by, scan_time)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(event_id, student_id) DO NOTHING
             RETURNING *"
        )
            .bind(&a.id).bind(&a.event_id).bind(&a.student_id).bind(&a.qr_token).bind(&a.status).bind(&a.marked_by).bind(a.scan_time)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::Conflict(ALREADY_MARKED.into()))?;

        sqlx::query("UPDATE event_registrations SET attendance_status = ? WHERE event_id = ? AND student_id = ?")
            .bind(ATTENDANCE_PRESENT).bind(&a.event_id).bind(&a.student_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        insert_activity(&mut tx, activity).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(saved)
    }

    async fn exists(&self, event_id: &str, student_id: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendance WHERE event_id = ? AND student_id = ?")
            .bind(event_id).bind(student_id).fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(count > 0)
    }

    async fn list_for_event(&self, event_id: &str) -> Result<Vec<AttendanceWithStudent>, AppError> {
        sqlx::query_as::<_, AttendanceWithStudent>(
            "SELECT a.*, s.first_name AS first_name, s.last_name AS last_name, s.prn AS prn, s.email AS email
             FROM attendance a JOIN students s ON s.id = a.student_id
             WHERE a.event_id = ?
             ORDER BY a.scan_time ASC"
        )
            .bind(event_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_for_student(&self, student_id: &str) -> Result<Vec<AttendanceWithEvent>, AppError> {
        sqlx::query_as::<_, AttendanceWithEvent>(
            "SELECT a.*, e.title AS event_title, e.event_date AS event_date, e.location AS event_location
             FROM attendance a JOIN events e ON e.id = a.event_id
             WHERE a.student_id = ?
             ORDER BY a.scan_time DESC"
        )
            .bind(student_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn count_for_student(&self, student_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM attendance WHERE student_id = ?").bind(student_id).fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
