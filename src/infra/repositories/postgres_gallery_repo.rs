use crate::domain::models::gallery::{GalleryFilter, GalleryImage};
use crate::domain::ports::GalleryRepository;
use crate::domain::services::pagination::PageRequest;
use crate::error::AppError;
use crate::infra::repositories::query::{push_eq, push_page, push_search};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

const SEARCH_COLUMNS: [&str; 3] = ["title", "description", "tags"];

pub struct PostgresGalleryRepo {
    pool: PgPool,
}

impl PostgresGalleryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &GalleryFilter) {
    if let Some(term) = &filter.search {
        push_search(qb, &SEARCH_COLUMNS, term);
    }
    push_eq(qb, "category", filter.category.as_deref());
}

#[async_trait]
impl GalleryRepository for PostgresGalleryRepo {
    async fn create(&self, g: &GalleryImage) -> Result<GalleryImage, AppError> {
        sqlx::query_as::<_, GalleryImage>(
            "INSERT INTO gallery_images (id, title, description, category, tags, image_path, thumbnail_path, uploaded_by, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING *"
        )
            .bind(&g.id).bind(&g.title).bind(&g.description).bind(&g.category).bind(&g.tags)
            .bind(&g.image_path).bind(&g.thumbnail_path).bind(&g.uploaded_by).bind(g.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<GalleryImage>, AppError> {
        sqlx::query_as::<_, GalleryImage>("SELECT * FROM gallery_images WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM gallery_images WHERE id = $1").bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Image not found".into())); }
        Ok(())
    }

    async fn search(&self, filter: &GalleryFilter, page: &PageRequest) -> Result<(Vec<GalleryImage>, i64), AppError> {
        let mut count_qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM gallery_images WHERE 1=1");
        push_filters(&mut count_qb, filter);

        let mut list_qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM gallery_images WHERE 1=1");
        push_filters(&mut list_qb, filter);
        list_qb.push(" ORDER BY created_at DESC");
        push_page(&mut list_qb, page.limit(), page.offset());

        let total = count_qb.build_query_scalar::<i64>().fetch_one(&self.pool).await.map_err(AppError::Database)?;
        let images = list_qb.build_query_as::<GalleryImage>().fetch_all(&self.pool).await.map_err(AppError::Database)?;
        Ok((images, total))
    }

    async fn list_categories(&self) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar("SELECT DISTINCT category FROM gallery_images ORDER BY category").fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
