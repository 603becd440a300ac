use crate::domain::models::student::{ProfileUpdate, Student};
use crate::domain::ports::StudentRepository;
use crate::domain::services::account::DUPLICATE_STUDENT;
use crate::domain::services::pagination::PageRequest;
use crate::error::{is_unique_violation, AppError};
use crate::infra::repositories::query::{push_page, push_search};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const SEARCH_COLUMNS: [&str; 4] = ["first_name", "last_name", "prn", "email"];

pub struct SqliteStudentRepo {
    pool: SqlitePool,
}

impl SqliteStudentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentRepository for SqliteStudentRepo {
    async fn create(&self, s: &Student) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(
            "INSERT INTO students (id, first_name, middle_name, last_name, prn, email, contact_number, department, year_of_study, role, password_hash, profile_image, email_verified, verification_token_hash, reset_token_hash, reset_token_expires_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&s.id).bind(&s.first_name).bind(&s.middle_name).bind(&s.last_name).bind(&s.prn).bind(&s.email)
            .bind(&s.contact_number).bind(&s.department).bind(s.year_of_study).bind(&s.role).bind(&s.password_hash)
            .bind(&s.profile_image).bind(s.email_verified).bind(&s.verification_token_hash).bind(&s.reset_token_hash)
            .bind(s.reset_token_expires_at).bind(s.created_at).bind(s.updated_at)
            .fetch_one(&self.pool).await
            .map_err(|e| if is_unique_violation(&e) { AppError::Conflict(DUPLICATE_STUDENT.into()) } else { AppError::Database(e) })
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Student>, AppError> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_prn(&self, prn: &str) -> Result<Option<Student>, AppError> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE prn = ?").bind(prn).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Student>, AppError> {
        let identifier = identifier.trim();
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE email = ? OR prn = ? LIMIT 1")
            .bind(identifier.to_lowercase()).bind(identifier.to_uppercase())
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn exists_by_prn_or_email(&self, prn: &str, email: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE prn = ? OR email = ?")
            .bind(prn).bind(email)
            .fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(count > 0)
    }

    async fn find_by_verification_hash(&self, token_hash: &str) -> Result<Option<Student>, AppError> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE verification_token_hash = ?")
            .bind(token_hash).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_reset_hash(&self, token_hash: &str, now: DateTime<Utc>) -> Result<Option<Student>, AppError> {
        sqlx::query_as::<_, Student>("SELECT * FROM students WHERE reset_token_hash = ? AND reset_token_expires_at > ?")
            .bind(token_hash).bind(now).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn mark_verified(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE students SET email_verified = ?, verification_token_hash = NULL, updated_at = ? WHERE id = ?")
            .bind(true).bind(Utc::now()).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn set_verification_token(&self, id: &str, token_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE students SET verification_token_hash = ?, updated_at = ? WHERE id = ?")
            .bind(token_hash).bind(Utc::now()).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn set_reset_token(&self, id: &str, token_hash: &str, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("UPDATE students SET reset_token_hash = ?, reset_token_expires_at = ?, updated_at = ? WHERE id = ?")
            .bind(token_hash).bind(expires_at).bind(Utc::now()).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn update_password(&self, id: &str, password_hash: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE students SET password_hash = ?, reset_token_hash = NULL, reset_token_expires_at = NULL, updated_at = ? WHERE id = ?")
            .bind(password_hash).bind(Utc::now()).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn update_profile(&self, id: &str, p: &ProfileUpdate) -> Result<Student, AppError> {
        sqlx::query_as::<_, Student>(
            "UPDATE students SET first_name = ?, middle_name = ?, last_name = ?, contact_number = ?, department = ?, year_of_study = ?, updated_at = ?
             WHERE id = ?
             RETURNING *"
        )
            .bind(&p.first_name).bind(&p.middle_name).bind(&p.last_name).bind(&p.contact_number)
            .bind(&p.department).bind(p.year_of_study).bind(Utc::now()).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Student not found".into()))
    }

    async fn update_profile_image(&self, id: &str, path: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE students SET profile_image = ?, updated_at = ? WHERE id = ?")
            .bind(path).bind(Utc::now()).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn set_role(&self, id: &str, role: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE students SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role).bind(Utc::now()).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Student not found".into())); }
        Ok(())
    }

    async fn search(&self, search: Option<&str>, page: &PageRequest) -> Result<(Vec<Student>, i64), AppError> {
        let mut count_qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM students WHERE 1=1");
        let mut list_qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM students WHERE 1=1");
        if let Some(term) = search {
            push_search(&mut count_qb, &SEARCH_COLUMNS, term);
            push_search(&mut list_qb, &SEARCH_COLUMNS, term);
        }
        list_qb.push(" ORDER BY created_at DESC");
        push_page(&mut list_qb, page.limit(), page.offset());

        let total = count_qb.build_query_scalar::<i64>().fetch_one(&self.pool).await.map_err(AppError::Database)?;
        let students = list_qb.build_query_as::<Student>().fetch_all(&self.pool).await.map_err(AppError::Database)?;
        Ok((students, total))
    }

    async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM students").fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
