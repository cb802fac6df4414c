use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use voyage_core::repository::{DestinationStore, StoreError};
use voyage_core::reservation::CatalogDestination;

/// Admin-curated destination catalog, separate from live provider search.
pub struct StoreCatalogRepository {
    pool: PgPool,
}

impl StoreCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct DestinationRow {
    id: Uuid,
    city: String,
    country: String,
    description: Option<String>,
}

impl DestinationRow {
    fn into_destination(self) -> CatalogDestination {
        CatalogDestination {
            id: self.id,
            city: self.city,
            country: self.country,
            description: self.description,
        }
    }
}

#[async_trait]
impl DestinationStore for StoreCatalogRepository {
    async fn create(&self, destination: &CatalogDestination) -> Result<Uuid, StoreError> {
        sqlx::query(
            "INSERT INTO destinations (id, city, country, description) VALUES ($1, $2, $3, $4)",
        )
        .bind(destination.id)
        .bind(&destination.city)
        .bind(&destination.country)
        .bind(&destination.description)
        .execute(&self.pool)
        .await?;

        Ok(destination.id)
    }

    async fn get(&self, id: Uuid) -> Result<Option<CatalogDestination>, StoreError> {
        let row = sqlx::query_as::<_, DestinationRow>(
            "SELECT id, city, country, description FROM destinations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(DestinationRow::into_destination))
    }

    async fn list(&self) -> Result<Vec<CatalogDestination>, StoreError> {
        let rows = sqlx::query_as::<_, DestinationRow>(
            "SELECT id, city, country, description FROM destinations ORDER BY country, city",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(DestinationRow::into_destination)
            .collect())
    }

    async fn update(&self, id: Uuid, destination: &CatalogDestination) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE destinations SET city = $1, country = $2, description = $3 WHERE id = $4",
        )
        .bind(&destination.city)
        .bind(&destination.country)
        .bind(&destination.description)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM destinations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
