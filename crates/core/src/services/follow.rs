//! Follow graph service.

use chrono::Utc;
use sea_orm::Set;
use yatube_common::{AppError, AppResult, IdGenerator};
use yatube_db::entities::{follow, user};
use yatube_db::repositories::{FollowRepository, UserRepository};

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub const fn new(follow_repo: FollowRepository, user_repo: UserRepository) -> Self {
        Self {
            follow_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow an author. Following yourself or an author twice does nothing.
    pub async fn follow(&self, user: &user::Model, author_username: &str) -> AppResult<()> {
        let author = self.user_repo.get_by_username(author_username).await?;

        if author.id == user.id {
            return Ok(());
        }

        if self.follow_repo.is_following(&user.id, &author.id).await? {
            return Ok(());
        }

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user.id.clone()),
            author_id: Set(author.id.clone()),
            created_at: Set(Utc::now().into()),
        };
        self.follow_repo.create(model).await?;

        tracing::info!(user_id = %user.id, author_id = %author.id, "User followed author");
        Ok(())
    }

    /// Stop following an author.
    pub async fn unfollow(&self, user: &user::Model, author_username: &str) -> AppResult<()> {
        let author = self.user_repo.get_by_username(author_username).await?;

        let edge = self
            .follow_repo
            .find_by_pair(&user.id, &author.id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("not following {author_username}")))?;

        self.follow_repo.delete(&edge.id).await?;

        tracing::info!(user_id = %user.id, author_id = %author.id, "User unfollowed author");
        Ok(())
    }

    /// Check whether `user_id` follows `author_id`.
    pub async fn is_following(&self, user_id: &str, author_id: &str) -> AppResult<bool> {
        self.follow_repo.is_following(user_id, author_id).await
    }
}
