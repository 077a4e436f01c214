//! Like repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{Like, PostLike, like, post_like};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use yatube_common::{AppError, AppResult};

/// Like repository for database operations.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// The like row a user holds on a post, if any.
    pub async fn find_for_user_post(
        &self,
        user_id: &str,
        post_id: &str,
    ) -> AppResult<Option<like::Model>> {
        Like::find()
            .join(JoinType::InnerJoin, like::Relation::PostLikes.def())
            .filter(like::Column::UserId.eq(user_id))
            .filter(post_like::Column::PostId.eq(post_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a like row and link it to a post in one transaction.
    pub async fn create_for_post(
        &self,
        model: like::ActiveModel,
        post_id: &str,
    ) -> AppResult<like::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let like = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let link = post_like::ActiveModel {
            post_id: Set(post_id.to_string()),
            like_id: Set(like.id.clone()),
        };
        PostLike::insert(link)
            .exec_without_returning(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(like)
    }

    /// Overwrite the liked flag of an existing row.
    pub async fn set_liked(&self, like: like::Model, is_liked: bool) -> AppResult<like::Model> {
        let mut active: like::ActiveModel = like.into();
        active.is_liked = Set(is_liked);

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Number of active likes on a post.
    pub async fn count_liked_for_post(&self, post_id: &str) -> AppResult<u64> {
        PostLike::find()
            .join(JoinType::InnerJoin, post_like::Relation::Like.def())
            .filter(post_like::Column::PostId.eq(post_id))
            .filter(like::Column::IsLiked.eq(true))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Active like counts keyed by post ID. Posts without likes are absent.
    pub async fn like_counts(&self, post_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(String, i64)> = PostLike::find()
            .select_only()
            .column(post_like::Column::PostId)
            .column_as(post_like::Column::LikeId.count(), "likes")
            .join(JoinType::InnerJoin, post_like::Relation::Like.def())
            .filter(post_like::Column::PostId.is_in(post_ids.iter().cloned()))
            .filter(like::Column::IsLiked.eq(true))
            .group_by(post_like::Column::PostId)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, u64::try_from(count).unwrap_or(0)))
            .collect())
    }

    /// IDs of posts the user currently likes.
    pub async fn liked_post_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        PostLike::find()
            .select_only()
            .column(post_like::Column::PostId)
            .join(JoinType::InnerJoin, post_like::Relation::Like.def())
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::IsLiked.eq(true))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_like(id: &str, is_liked: bool) -> like::Model {
        like::Model {
            id: id.to_string(),
            is_liked,
            user_id: "u1".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_for_user_post() {
        let row = create_test_like("l1", true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[row.clone()]])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let found = repo.find_for_user_post("u1", "p1").await.unwrap();

        assert_eq!(found, Some(row));
    }

    #[tokio::test]
    async fn test_set_liked_flips_flag() {
        let row = create_test_like("l1", true);
        let updated = create_test_like("l1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[updated.clone()]])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let result = repo.set_liked(row, false).await.unwrap();

        assert!(!result.is_liked);
    }

    #[tokio::test]
    async fn test_like_counts_without_posts_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = LikeRepository::new(db);
        let counts = repo.like_counts(&[]).await.unwrap();

        assert!(counts.is_empty());
    }
}
