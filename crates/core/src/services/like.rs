//! Like toggle service.

use chrono::Utc;
use sea_orm::Set;
use serde::Serialize;
use yatube_common::{AppResult, IdGenerator};
use yatube_db::entities::{like, user};
use yatube_db::repositories::{LikeRepository, PostRepository};

/// Outcome of a like toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeToggle {
    /// The flag the client sent, echoed back unchanged.
    pub result: bool,
    /// Active likes on the post after the toggle.
    #[serde(rename = "like_cout")]
    pub like_count: u64,
}

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    like_repo: LikeRepository,
    post_repo: PostRepository,
    id_gen: IdGenerator,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(like_repo: LikeRepository, post_repo: PostRepository) -> Self {
        Self {
            like_repo,
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Toggle the user's like on a post.
    ///
    /// Without an existing row a new one is created holding the negation of
    /// `client_flag`; an existing row has its state flipped.
    pub async fn toggle(
        &self,
        user: &user::Model,
        post_id: &str,
        client_flag: bool,
    ) -> AppResult<LikeToggle> {
        let post = self.post_repo.get_by_id(post_id).await?;

        match self.like_repo.find_for_user_post(&user.id, &post.id).await? {
            Some(existing) => {
                let next = !existing.is_liked;
                self.like_repo.set_liked(existing, next).await?;
            }
            None => {
                let model = like::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    is_liked: Set(!client_flag),
                    user_id: Set(user.id.clone()),
                    created_at: Set(Utc::now().into()),
                };
                self.like_repo.create_for_post(model, &post.id).await?;
            }
        }

        let like_count = self.like_repo.count_liked_for_post(&post.id).await?;

        tracing::debug!(user_id = %user.id, post_id = %post.id, like_count, "Toggled like");

        Ok(LikeToggle {
            result: client_flag,
            like_count,
        })
    }

    /// Active likes on a post.
    pub async fn like_count(&self, post_id: &str) -> AppResult<u64> {
        self.like_repo.count_liked_for_post(post_id).await
    }

    /// IDs of posts the user currently likes.
    pub async fn liked_post_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        self.like_repo.liked_post_ids(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_serializes_with_wire_names() {
        let toggle = LikeToggle {
            result: true,
            like_count: 3,
        };
        let json = serde_json::to_value(toggle).unwrap_or_default();

        assert_eq!(json, serde_json::json!({"result": true, "like_cout": 3}));
    }
}
