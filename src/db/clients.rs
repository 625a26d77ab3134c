use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{like_pattern, Database};
use crate::models::{Client, ClientInput, ClientStatus, Page, Paginated};
use crate::store::ClientStore;

const SEARCH_FILTER: &str = r#"
    deleted_at IS NULL
    AND ($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1 OR document ILIKE $1)
"#;

#[async_trait]
impl ClientStore for Database {
    async fn create_client(&self, owner_id: Uuid, input: &ClientInput) -> Result<Client> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (name, email, phone, website, legal_type, document, address,
                                 category, status, notes, tags, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.website)
        .bind(input.legal_type)
        .bind(&input.document)
        .bind(&input.address)
        .bind(input.category)
        .bind(input.status)
        .bind(&input.notes)
        .bind(&input.tags)
        .bind(owner_id)
        .fetch_one(self.get_pool())
        .await?;

        Ok(client)
    }

    async fn get_client(&self, id: Uuid) -> Result<Option<Client>> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1 AND deleted_at IS NULL")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?;

        Ok(client)
    }

    async fn update_client(&self, id: Uuid, input: &ClientInput) -> Result<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = $1, email = $2, phone = $3, website = $4, legal_type = $5, document = $6,
                address = $7, category = $8, status = $9, notes = $10, tags = $11, updated_at = now()
            WHERE id = $12 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.website)
        .bind(input.legal_type)
        .bind(&input.document)
        .bind(&input.address)
        .bind(input.category)
        .bind(input.status)
        .bind(&input.notes)
        .bind(&input.tags)
        .bind(id)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(client)
    }

    async fn soft_delete_client(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET deleted_at = $1, status = $2, updated_at = $1
            WHERE id = $3 AND deleted_at IS NULL
            "#,
        )
        .bind(at)
        .bind(ClientStatus::Inactive)
        .bind(id)
        .execute(self.get_pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_clients(&self, query: Option<&str>, page: Page) -> Result<Paginated<Client>> {
        let pattern = query.map(str::trim).filter(|q| !q.is_empty()).map(like_pattern);

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM clients WHERE {SEARCH_FILTER}"))
            .bind(&pattern)
            .fetch_one(self.get_pool())
            .await?;

        let clients = sqlx::query_as::<_, Client>(&format!(
            "SELECT * FROM clients WHERE {SEARCH_FILTER} ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(&pattern)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(self.get_pool())
        .await?;

        Ok(Paginated::new(clients, total, page))
    }
}
