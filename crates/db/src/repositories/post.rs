//! Post repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{Post, PostView, post, post_view};
use crate::repositories::Paged;
use sea_orm::sea_query::{Expr, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select,
};
use yatube_common::{AppError, AppResult};

/// Escape character for literal `%` and `_` in search patterns.
pub const LIKE_ESCAPE: char = '!';

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post. Comments, views and like links go with it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count posts written by a user.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// One page of all posts, newest first. `page` is 1-based.
    pub async fn find_all_page(&self, page: u64, page_size: u64) -> AppResult<Paged<post::Model>> {
        self.fetch_page(Self::newest_first(Post::find()), page, page_size)
            .await
    }

    /// One page of a group's posts, newest first.
    pub async fn find_by_group_page(
        &self,
        group_id: &str,
        page: u64,
        page_size: u64,
    ) -> AppResult<Paged<post::Model>> {
        let query = Post::find().filter(post::Column::GroupId.eq(group_id));
        self.fetch_page(Self::newest_first(query), page, page_size)
            .await
    }

    /// One page of an author's posts, newest first.
    pub async fn find_by_author_page(
        &self,
        author_id: &str,
        page: u64,
        page_size: u64,
    ) -> AppResult<Paged<post::Model>> {
        let query = Post::find().filter(post::Column::AuthorId.eq(author_id));
        self.fetch_page(Self::newest_first(query), page, page_size)
            .await
    }

    /// One page of posts written by any of `author_ids`, newest first.
    pub async fn find_by_authors_page(
        &self,
        author_ids: &[String],
        page: u64,
        page_size: u64,
    ) -> AppResult<Paged<post::Model>> {
        if author_ids.is_empty() {
            return Ok(Paged::empty());
        }

        let query = Post::find().filter(post::Column::AuthorId.is_in(author_ids.iter().cloned()));
        self.fetch_page(Self::newest_first(query), page, page_size)
            .await
    }

    /// One page of posts ordered by view count, then newest first.
    pub async fn find_most_viewed_page(
        &self,
        page: u64,
        page_size: u64,
    ) -> AppResult<Paged<post::Model>> {
        let query = Post::find()
            .column_as(post_view::Column::IpId.count(), "total_views")
            .join(JoinType::LeftJoin, post::Relation::Views.def())
            .group_by(post::Column::Id)
            .order_by_desc(Expr::cust("total_views"));
        self.fetch_page(Self::newest_first(query), page, page_size)
            .await
    }

    /// Posts whose text matches any of the given `LIKE` patterns, newest first.
    ///
    /// Matching ignores case: patterns are folded and compared with the
    /// folded copy of the text. Patterns must already carry their `%`
    /// wrapping and have literal wildcards escaped with [`LIKE_ESCAPE`].
    pub async fn search(&self, patterns: &[String]) -> AppResult<Vec<post::Model>> {
        if patterns.is_empty() {
            return Ok(Vec::new());
        }

        let mut folded: Vec<String> = patterns.iter().map(|p| post::fold_case(p)).collect();
        folded.sort();
        folded.dedup();

        let condition = folded.into_iter().fold(Condition::any(), |cond, pattern| {
            cond.add(post::Column::SearchText.like(LikeExpr::new(pattern).escape(LIKE_ESCAPE)))
        });

        Self::newest_first(Post::find().filter(condition))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// View counts keyed by post ID. Posts without views are absent.
    pub async fn view_counts(&self, post_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if post_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(String, i64)> = PostView::find()
            .select_only()
            .column(post_view::Column::PostId)
            .column_as(post_view::Column::IpId.count(), "views")
            .filter(post_view::Column::PostId.is_in(post_ids.iter().cloned()))
            .group_by(post_view::Column::PostId)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (id, u64::try_from(count).unwrap_or(0)))
            .collect())
    }

    fn newest_first(query: Select<Post>) -> Select<Post> {
        query
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::Id)
    }

    async fn fetch_page(
        &self,
        query: Select<Post>,
        page: u64,
        page_size: u64,
    ) -> AppResult<Paged<post::Model>> {
        let paginator = query.paginate(self.db.as_ref(), page_size.max(1));

        let total = paginator
            .num_items()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let items = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(Paged { items, total })
    }
}
