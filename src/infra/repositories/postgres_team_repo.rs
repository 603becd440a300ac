use crate::domain::models::team::{TeamFilter, TeamMember};
use crate::domain::ports::TeamRepository;
use crate::domain::services::pagination::PageRequest;
use crate::error::AppError;
use crate::infra::repositories::query::{push_eq, push_page, push_search};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

const SEARCH_COLUMNS: [&str; 2] = ["name", "position"];

pub struct PostgresTeamRepo {
    pool: PgPool,
}

impl PostgresTeamRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &TeamFilter) {
    if let Some(term) = &filter.search {
        push_search(qb, &SEARCH_COLUMNS, term);
    }
    push_eq(qb, "category", filter.category.as_deref());
}

#[async_trait]
impl TeamRepository for PostgresTeamRepo {
    async fn create(&self, t: &TeamMember) -> Result<TeamMember, AppError> {
        sqlx::query_as::<_, TeamMember>(
            "INSERT INTO team_members (id, name, position, category, bio, photo, linkedin, github, instagram, email, student_id, display_order, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING *"
        )
            .bind(&t.id).bind(&t.name).bind(&t.position).bind(&t.category).bind(&t.bio).bind(&t.photo)
            .bind(&t.linkedin).bind(&t.github).bind(&t.instagram).bind(&t.email).bind(&t.student_id)
            .bind(t.display_order).bind(t.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM team_members WHERE id = $1").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Team member not found".into())); }
        Ok(())
    }

    async fn search(&self, filter: &TeamFilter, page: &PageRequest) -> Result<(Vec<TeamMember>, i64), AppError> {
        let mut count_qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM team_members WHERE 1=1");
        push_filters(&mut count_qb, filter);

        let mut list_qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM team_members WHERE 1=1");
        push_filters(&mut list_qb, filter);
        list_qb.push(" ORDER BY display_order ASC, name ASC");
        push_page(&mut list_qb, page.limit(), page.offset());

        let total = count_qb.build_query_scalar::<i64>().fetch_one(&self.pool).await.map_err(AppError::Database)?;
        let members = list_qb.build_query_as::<TeamMember>().fetch_all(&self.pool).await.map_err(AppError::Database)?;
        Ok((members, total))
    }
}
