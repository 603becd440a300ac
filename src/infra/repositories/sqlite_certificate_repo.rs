use crate::domain::models::certificate::{Certificate, CertificateDetails, CertificateWithEvent};
use crate::domain::ports::CertificateRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteCertificateRepo {
    pool: SqlitePool,
}

impl SqliteCertificateRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CertificateRepository for SqliteCertificateRepo {
    async fn list_missing(&self, event_id: &str) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar(
            "SELECT a.student_id FROM attendance a
             LEFT JOIN certificates c ON c.event_id = a.event_id AND c.student_id = a.student_id
             WHERE a.event_id = ? AND a.status = 'present' AND c.id IS NULL
             ORDER BY a.scan_time ASC"
        )
            .bind(event_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn create_batch(&self, certificates: &[Certificate]) -> Result<u64, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut written = 0;
        for c in certificates {
            let result = sqlx::query(
                "INSERT INTO certificates (id, event_id, student_id, certificate_id, issue_date, verification_link)
                 VALUES (?, ?, ?, ?, ?, ?)
                 ON CONFLICT DO NOTHING"
            )
                .bind(&c.id).bind(&c.event_id).bind(&c.student_id).bind(&c.certificate_id).bind(c.issue_date).bind(&c.verification_link)
                .execute(&mut *tx).await.map_err(AppError::Database)?;
            written += result.rows_affected();
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(written)
    }

    async fn list_for_student(&self, student_id: &str) -> Result<Vec<CertificateWithEvent>, AppError> {
        sqlx::query_as::<_, CertificateWithEvent>(
            "SELECT c.*, e.title AS event_title, e.event_date AS event_date
             FROM certificates c JOIN events e ON e.id = c.event_id
             WHERE c.student_id = ?
             ORDER BY c.issue_date DESC"
        )
            .bind(student_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_details(&self, certificate_id: &str) -> Result<Option<CertificateDetails>, AppError> {
        sqlx::query_as::<_, CertificateDetails>(
            "SELECT c.*, e.title AS event_title, e.event_date AS event_date, s.first_name AS first_name, s.last_name AS last_name, s.prn AS prn
             FROM certificates c
             JOIN events e ON e.id = c.event_id
             JOIN students s ON s.id = c.student_id
             WHERE c.certificate_id = ?"
        )
            .bind(certificate_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn count_for_student(&self, student_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM certificates WHERE student_id = ?").bind(student_id).fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
