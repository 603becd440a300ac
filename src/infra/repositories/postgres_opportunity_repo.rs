use crate::domain::models::opportunity::{Opportunity, OpportunityFilter};
use crate::domain::ports::OpportunityRepository;
use crate::domain::services::pagination::PageRequest;
use crate::error::AppError;
use crate::infra::repositories::query::{push_eq, push_page, push_search};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

const SEARCH_COLUMNS: [&str; 4] = ["title", "description", "organizer", "tech_stack"];

pub struct PostgresOpportunityRepo {
    pool: PgPool,
}

impl PostgresOpportunityRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &OpportunityFilter) {
    if let Some(term) = &filter.search {
        push_search(qb, &SEARCH_COLUMNS, term);
    }
    push_eq(qb, "opportunity_type", filter.opportunity_type.as_deref());
}

#[async_trait]
impl OpportunityRepository for PostgresOpportunityRepo {
    async fn create(&self, o: &Opportunity) -> Result<Opportunity, AppError> {
        sqlx::query_as::<_, Opportunity>(
            "INSERT INTO opportunities (id, title, description, opportunity_type, organizer, location, tech_stack, start_date, end_date, apply_link, is_featured, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING *"
        )
            .bind(&o.id).bind(&o.title).bind(&o.description).bind(&o.opportunity_type).bind(&o.organizer).bind(&o.location)
            .bind(&o.tech_stack).bind(o.start_date).bind(o.end_date).bind(&o.apply_link).bind(o.is_featured).bind(o.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM opportunities WHERE id = $1").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Opportunity not found".into())); }
        Ok(())
    }

    async fn search(&self, filter: &OpportunityFilter, page: &PageRequest) -> Result<(Vec<Opportunity>, i64), AppError> {
        let mut count_qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM opportunities WHERE 1=1");
        push_filters(&mut count_qb, filter);

        let mut list_qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM opportunities WHERE 1=1");
        push_filters(&mut list_qb, filter);
        list_qb.push(" ORDER BY is_featured DESC, start_date ASC");
        push_page(&mut list_qb, page.limit(), page.offset());

        let total = count_qb.build_query_scalar::<i64>().fetch_one(&self.pool).await.map_err(AppError::Database)?;
        let items = list_qb.build_query_as::<Opportunity>().fetch_all(&self.pool).await.map_err(AppError::Database)?;
        Ok((items, total))
    }

    async fn list_featured(&self, limit: i64) -> Result<Vec<Opportunity>, AppError> {
        sqlx::query_as::<_, Opportunity>("SELECT * FROM opportunities WHERE is_featured = $1 ORDER BY start_date ASC LIMIT $2")
            .bind(true).bind(limit).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
