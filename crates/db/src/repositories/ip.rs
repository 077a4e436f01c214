//! Visitor address and post view repository.

use std::sync::Arc;

use crate::entities::{Ip, PostView, ip, post_view};
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use yatube_common::{AppError, AppResult};

/// Repository for visitor records and the post views they produce.
#[derive(Clone)]
pub struct IpRepository {
    db: Arc<DatabaseConnection>,
}

impl IpRepository {
    /// Create a new IP repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Oldest record for an address.
    pub async fn find_by_address(&self, address: &str) -> AppResult<Option<ip::Model>> {
        Ip::find()
            .filter(ip::Column::Address.eq(address))
            .order_by_asc(ip::Column::CreatedAt)
            .order_by_asc(ip::Column::Id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a visitor record.
    pub async fn create(&self, model: ip::ActiveModel) -> AppResult<ip::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count every visitor record.
    pub async fn count_all(&self) -> AppResult<u64> {
        Ip::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count visitor records created in `[start, end)`.
    pub async fn count_between(
        &self,
        start: DateTimeWithTimeZone,
        end: DateTimeWithTimeZone,
    ) -> AppResult<u64> {
        Ip::find()
            .filter(ip::Column::CreatedAt.gte(start))
            .filter(ip::Column::CreatedAt.lt(end))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Link a visitor to a post. Repeated views are ignored.
    pub async fn add_view(&self, post_id: &str, ip_id: &str) -> AppResult<()> {
        let view = post_view::ActiveModel {
            post_id: Set(post_id.to_string()),
            ip_id: Set(ip_id.to_string()),
        };

        PostView::insert(view)
            .on_conflict(
                OnConflict::columns([post_view::Column::PostId, post_view::Column::IpId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    #[tokio::test]
    async fn test_find_by_address() {
        let record = ip::Model {
            id: "i1".to_string(),
            address: "10.0.0.1".to_string(),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[record.clone()]])
                .into_connection(),
        );

        let repo = IpRepository::new(db);
        let found = repo.find_by_address("10.0.0.1").await.unwrap();

        assert_eq!(found, Some(record));
    }

    #[tokio::test]
    async fn test_add_view_ignores_duplicates() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 0,
                    },
                ])
                .into_connection(),
        );

        let repo = IpRepository::new(db);

        assert!(repo.add_view("p1", "i1").await.is_ok());
        assert!(repo.add_view("p1", "i1").await.is_ok());
    }
}
