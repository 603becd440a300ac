use crate::domain::models::activity::ActivityLog;
use crate::domain::models::registration::{PaymentStatus, Registration, RegistrationWithEvent, RegistrationWithStudent};
use crate::domain::ports::RegistrationRepository;
use crate::domain::services::event_registration::{ALREADY_REGISTERED, EVENT_FULL};
use crate::error::AppError;
use crate::infra::repositories::postgres_activity_repo::insert_activity;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;

const WITH_EVENT: &str = "SELECT r.*, e.title AS event_title, e.event_date AS event_date, e.location AS event_location, e.fee AS event_fee
     FROM event_registrations r JOIN events e ON e.id = r.event_id";

pub struct PostgresRegistrationRepo {
    pool: PgPool,
}

impl PostgresRegistrationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RegistrationRepository for PostgresRegistrationRepo {
    async fn register(&self, r: &Registration, capacity: Option<i32>, activity: &ActivityLog) -> Result<Registration, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        if let Some(capacity) = capacity {
            // Serializes concurrent registrations for the same event until commit.
            sqlx::query("SELECT id FROM events WHERE id = $1 FOR UPDATE")
                .bind(&r.event_id).fetch_optional(&mut *tx).await.map_err(AppError::Database)?
                .ok_or_else(|| AppError::NotFound("Event not found".into()))?;
            let taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event_registrations WHERE event_id = $1")
                .bind(&r.event_id).fetch_one(&mut *tx).await.map_err(AppError::Database)?;
            if taken >= capacity as i64 {
                return Err(AppError::Conflict(EVENT_FULL.into()));
            }
        }

        let created = sqlx::query_as::<_, Registration>(
            "INSERT INTO event_registrations (id, event_id, student_id, payment_status, attendance_status, payment_order_id, payment_id, amount_paid, registration_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             ON CONFLICT(event_id, student_id) DO NOTHING
             RETURNING *"
        )
            .bind(&r.id).bind(&r.event_id).bind(&r.student_id).bind(&r.payment_status).bind(&r.attendance_status)
            .bind(&r.payment_order_id).bind(&r.payment_id).bind(r.amount_paid).bind(r.registration_date)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::Conflict(ALREADY_REGISTERED.into()))?;

        insert_activity(&mut tx, activity).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Registration>, AppError> {
        sqlx::query_as::<_, Registration>("SELECT * FROM event_registrations WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find(&self, event_id: &str, student_id: &str) -> Result<Option<Registration>, AppError> {
        sqlx::query_as::<_, Registration>("SELECT * FROM event_registrations WHERE event_id = $1 AND student_id = $2")
            .bind(event_id).bind(student_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn count_for_event(&self, event_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM event_registrations WHERE event_id = $1").bind(event_id).fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn count_for_student(&self, student_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM event_registrations WHERE student_id = $1").bind(student_id).fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_for_student(&self, student_id: &str) -> Result<Vec<RegistrationWithEvent>, AppError> {
        sqlx::query_as::<_, RegistrationWithEvent>(&format!("{} WHERE r.student_id = $1 ORDER BY e.event_date DESC", WITH_EVENT))
            .bind(student_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_upcoming_for_student(&self, student_id: &str, now: NaiveDateTime, limit: i64) -> Result<Vec<RegistrationWithEvent>, AppError> {
        sqlx::query_as::<_, RegistrationWithEvent>(&format!("{} WHERE r.student_id = $1 AND e.event_date >= $2 ORDER BY e.event_date ASC LIMIT $3", WITH_EVENT))
            .bind(student_id).bind(now).bind(limit).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_for_event(&self, event_id: &str) -> Result<Vec<RegistrationWithStudent>, AppError> {
        sqlx::query_as::<_, RegistrationWithStudent>(
            "SELECT r.*, s.first_name AS first_name, s.last_name AS last_name, s.prn AS prn, s.email AS email, s.department AS department
             FROM event_registrations r JOIN students s ON s.id = r.student_id
             WHERE r.event_id = $1
             ORDER BY r.registration_date ASC"
        )
            .bind(event_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn set_order(&self, id: &str, order_id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE event_registrations SET payment_order_id = $1, payment_status = $2 WHERE id = $3")
            .bind(order_id).bind(PaymentStatus::Pending.as_str()).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn complete_payment(&self, id: &str, payment_id: &str, amount: f64, activity: &ActivityLog) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("UPDATE event_registrations SET payment_status = $1, payment_id = $2, amount_paid = $3 WHERE id = $4")
            .bind(PaymentStatus::Completed.as_str()).bind(payment_id).bind(amount).bind(id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        insert_activity(&mut tx, activity).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn set_payment_status(&self, id: &str, status: PaymentStatus) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE event_registrations SET payment_status = $1 WHERE id = $2")
            .bind(status.as_str()).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Registration not found".into())); }
        Ok(())
    }

    async fn fail_pending_payment(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE event_registrations SET payment_status = $1 WHERE id = $2 AND payment_status IN ($3, $4)")
            .bind(PaymentStatus::Failed.as_str()).bind(id)
            .bind(PaymentStatus::Pending.as_str()).bind(PaymentStatus::Failed.as_str())
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM event_registrations").fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn count_by_payment_status(&self, status: PaymentStatus) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM event_registrations WHERE payment_status = $1")
            .bind(status.as_str()).fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
