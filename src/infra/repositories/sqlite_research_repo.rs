use crate::domain::models::activity::ActivityLog;
use crate::domain::models::research::{MemberStatus, ProjectListing, ProjectMember, ProjectMemberWithStudent, ResearchFilter, ResearchProject};
use crate::domain::ports::ResearchRepository;
use crate::domain::services::pagination::PageRequest;
use crate::domain::services::research::{ALREADY_REQUESTED, PROJECT_FULL};
use crate::error::AppError;
use crate::infra::repositories::query::{push_eq, push_page, push_search};
use crate::infra::repositories::sqlite_activity_repo::insert_activity;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const SEARCH_COLUMNS: [&str; 3] = ["p.title", "p.description", "p.tech_stack"];

pub struct SqliteResearchRepo {
    pool: SqlitePool,
}

impl SqliteResearchRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ResearchFilter) {
    if let Some(term) = &filter.search {
        push_search(qb, &SEARCH_COLUMNS, term);
    }
    push_eq(qb, "p.status", filter.status.as_deref());
}

#[async_trait]
impl ResearchRepository for SqliteResearchRepo {
    async fn create(&self, p: &ResearchProject) -> Result<ResearchProject, AppError> {
        sqlx::query_as::<_, ResearchProject>(
            "INSERT INTO research_projects (id, title, description, tech_stack, status, coordinator_id, domain_lead_id, max_members, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&p.id).bind(&p.title).bind(&p.description).bind(&p.tech_stack).bind(&p.status)
            .bind(&p.coordinator_id).bind(&p.domain_lead_id).bind(p.max_members).bind(p.created_at).bind(p.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ResearchProject>, AppError> {
        sqlx::query_as::<_, ResearchProject>("SELECT * FROM research_projects WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn search(&self, filter: &ResearchFilter, page: &PageRequest) -> Result<(Vec<ProjectListing>, i64), AppError> {
        let mut count_qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM research_projects p WHERE 1=1");
        push_filters(&mut count_qb, filter);

        let mut list_qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT p.*, (SELECT COUNT(*) FROM project_members m WHERE m.project_id = p.id AND m.status = 'accepted') AS member_count
             FROM research_projects p WHERE 1=1"
        );
        push_filters(&mut list_qb, filter);
        list_qb.push(" ORDER BY p.created_at DESC");
        push_page(&mut list_qb, page.limit(), page.offset());

        let total = count_qb.build_query_scalar::<i64>().fetch_one(&self.pool).await.map_err(AppError::Database)?;
        let projects = list_qb.build_query_as::<ProjectListing>().fetch_all(&self.pool).await.map_err(AppError::Database)?;
        Ok((projects, total))
    }

    async fn set_status(&self, id: &str, status: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE research_projects SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status).bind(Utc::now()).bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Project not found".into())); }
        Ok(())
    }

    async fn count_accepted(&self, project_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM project_members WHERE project_id = ? AND status = 'accepted'")
            .bind(project_id).fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn count_accepted_for_student(&self, student_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM project_members WHERE student_id = ? AND status = 'accepted'")
            .bind(student_id).fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_membership(&self, project_id: &str, student_id: &str) -> Result<Option<ProjectMember>, AppError> {
        sqlx::query_as::<_, ProjectMember>("SELECT * FROM project_members WHERE project_id = ? AND student_id = ?")
            .bind(project_id).bind(student_id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn request_join(&self, m: &ProjectMember, activity: &ActivityLog) -> Result<ProjectMember, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let saved = sqlx::query_as::<_, ProjectMember>(
            "INSERT INTO project_members (id, project_id, student_id, role, status, message, joined_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(project_id, student_id) DO NOTHING
             RETURNING *"
        )
            .bind(&m.id).bind(&m.project_id).bind(&m.student_id).bind(&m.role).bind(&m.status).bind(&m.message).bind(m.joined_at)
            .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::Conflict(ALREADY_REQUESTED.into()))?;
        insert_activity(&mut tx, activity).await?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(saved)
    }

    async fn leave(&self, project_id: &str, student_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM project_members WHERE project_id = ? AND student_id = ?")
            .bind(project_id).bind(student_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_members(&self, project_id: &str, status: Option<MemberStatus>) -> Result<Vec<ProjectMemberWithStudent>, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT m.*, s.first_name AS first_name, s.last_name AS last_name, s.prn AS prn, s.department AS department
             FROM project_members m JOIN students s ON s.id = m.student_id
             WHERE m.project_id = "
        );
        qb.push_bind(project_id.to_string());
        push_eq(&mut qb, "m.status", status.map(|s| s.as_str()));
        qb.push(" ORDER BY m.joined_at ASC");
        qb.build_query_as::<ProjectMemberWithStudent>().fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn set_member_status(&self, project_id: &str, member_id: &str, status: MemberStatus) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        if status == MemberStatus::Accepted {
            let max_members: i32 = sqlx::query_scalar("SELECT max_members FROM research_projects WHERE id = ?")
                .bind(project_id)
                .fetch_optional(&mut *tx).await.map_err(AppError::Database)?
                .ok_or_else(|| AppError::NotFound("Project not found".into()))?;
            let accepted: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM project_members WHERE project_id = ? AND status = 'accepted' AND id <> ?"
            )
                .bind(project_id).bind(member_id)
                .fetch_one(&mut *tx).await.map_err(AppError::Database)?;
            if accepted >= i64::from(max_members) {
                return Err(AppError::Conflict(PROJECT_FULL.into()));
            }
        }
        let result = sqlx::query("UPDATE project_members SET status = ? WHERE id = ? AND project_id = ?")
            .bind(status.as_str()).bind(member_id).bind(project_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Member not found".into())); }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
