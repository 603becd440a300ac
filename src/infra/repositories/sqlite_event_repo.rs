use crate::domain::models::event::{CalendarEvent, Event, EventFilter, EventTimeframe};
use crate::domain::ports::EventRepository;
use crate::domain::services::pagination::PageRequest;
use crate::error::AppError;
use crate::infra::repositories::query::{push_eq, push_page, push_search};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const SEARCH_COLUMNS: [&str; 3] = ["title", "description", "location"];
const IMPORTANT_DATES_LOOKAHEAD: i64 = 20;

pub struct SqliteEventRepo {
    pool: SqlitePool,
}

impl SqliteEventRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &EventFilter, now: NaiveDateTime) {
    if let Some(term) = &filter.search {
        push_search(qb, &SEARCH_COLUMNS, term);
    }
    push_eq(qb, "category", filter.category.as_deref());
    match filter.timeframe {
        EventTimeframe::Upcoming => {
            qb.push(" AND event_date >= ").push_bind(now);
        }
        EventTimeframe::Past => {
            qb.push(" AND event_date < ").push_bind(now);
        }
        EventTimeframe::All => {}
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepo {
    async fn create(&self, e: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            "INSERT INTO events (id, title, description, event_date, location, fee, category, capacity, manual_access_code, banner_image, registration_deadline, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&e.id).bind(&e.title).bind(&e.description).bind(e.event_date).bind(&e.location).bind(e.fee)
            .bind(&e.category).bind(e.capacity).bind(&e.manual_access_code).bind(&e.banner_image)
            .bind(e.registration_deadline).bind(e.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, e: &Event) -> Result<Event, AppError> {
        sqlx::query_as::<_, Event>(
            "UPDATE events SET title = ?, description = ?, event_date = ?, location = ?, fee = ?, category = ?, capacity = ?, manual_access_code = ?, banner_image = ?, registration_deadline = ?
             WHERE id = ?
             RETURNING *"
        )
            .bind(&e.title).bind(&e.description).bind(e.event_date).bind(&e.location).bind(e.fee).bind(&e.category)
            .bind(e.capacity).bind(&e.manual_access_code).bind(&e.banner_image).bind(e.registration_deadline)
            .bind(&e.id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Event not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Event not found".into())); }
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn search(&self, filter: &EventFilter, now: NaiveDateTime, page: &PageRequest) -> Result<(Vec<Event>, i64), AppError> {
        let mut count_qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM events WHERE 1=1");
        push_filters(&mut count_qb, filter, now);

        let mut list_qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM events WHERE 1=1");
        push_filters(&mut list_qb, filter, now);
        list_qb.push(match filter.timeframe {
            EventTimeframe::Past => " ORDER BY event_date DESC",
            _ => " ORDER BY event_date ASC",
        });
        push_page(&mut list_qb, page.limit(), page.offset());

        let total = count_qb.build_query_scalar::<i64>().fetch_one(&self.pool).await.map_err(AppError::Database)?;
        let events = list_qb.build_query_as::<Event>().fetch_all(&self.pool).await.map_err(AppError::Database)?;
        Ok((events, total))
    }

    async fn list_upcoming(&self, now: NaiveDateTime, limit: i64) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE event_date >= ? ORDER BY event_date ASC LIMIT ?")
            .bind(now).bind(limit).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_all(&self) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events ORDER BY event_date DESC").fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_in_window(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        category: Option<&str>,
        student_id: Option<&str>,
    ) -> Result<Vec<CalendarEvent>, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT e.*, CASE WHEN r.id IS NULL THEN 0 ELSE 1 END AS is_registered
             FROM events e
             LEFT JOIN event_registrations r ON r.event_id = e.id AND r.student_id = "
        );
        qb.push_bind(student_id.unwrap_or_default().to_string());
        qb.push(" WHERE e.event_date >= ").push_bind(start);
        qb.push(" AND e.event_date < ").push_bind(end);
        push_eq(&mut qb, "e.category", category);
        qb.push(" ORDER BY e.event_date ASC");

        qb.build_query_as::<CalendarEvent>().fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_open_deadlines(&self, now: NaiveDateTime) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE registration_deadline IS NOT NULL AND registration_deadline >= ? ORDER BY registration_deadline ASC LIMIT ?"
        )
            .bind(now).bind(IMPORTANT_DATES_LOOKAHEAD)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_upcoming_paid(&self, now: NaiveDateTime) -> Result<Vec<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE fee > 0 AND event_date >= ? ORDER BY event_date ASC LIMIT ?")
            .bind(now).bind(IMPORTANT_DATES_LOOKAHEAD)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_categories(&self) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar("SELECT DISTINCT category FROM events ORDER BY category").fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn count(&self) -> Result<i64, AppError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM events").fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
