//! Post service.

use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;
use yatube_common::{AppError, AppResult, IdGenerator};
use yatube_db::entities::{comment, post, user};
use yatube_db::repositories::{CommentRepository, GroupRepository, PostRepository};

use crate::services::feed::{FeedService, PostView};

/// Input for creating or editing a post.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostInput {
    #[validate(length(min = 1, max = 10000))]
    pub text: String,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    #[validate(length(max = 512))]
    pub image: Option<String>,
}

/// A post with its comments, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    /// The decorated post.
    pub post: PostView,
    /// Comments on the post.
    pub comments: Vec<comment::Model>,
    /// Number of posts the author wrote.
    pub author_posts_count: u64,
}

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    group_repo: GroupRepository,
    comment_repo: CommentRepository,
    feed: FeedService,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        group_repo: GroupRepository,
        comment_repo: CommentRepository,
        feed: FeedService,
    ) -> Self {
        Self {
            post_repo,
            group_repo,
            comment_repo,
            feed,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a new post.
    pub async fn create(&self, author: &user::Model, input: PostInput) -> AppResult<post::Model> {
        let (text, group_id, image) = self.check_input(input).await?;

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            search_text: Set(post::fold_case(&text)),
            text: Set(text),
            pub_date: Set(Utc::now().into()),
            image: Set(image),
            author_id: Set(author.id.clone()),
            group_id: Set(group_id),
        };

        let post = self.post_repo.create(model).await?;
        tracing::info!(post_id = %post.id, author_id = %author.id, "Created post");
        Ok(post)
    }

    /// Get a post by ID.
    pub async fn get(&self, post_id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(post_id).await
    }

    /// A post with its comments.
    pub async fn detail(&self, post_id: &str) -> AppResult<PostDetail> {
        let post = self.post_repo.get_by_id(post_id).await?;
        let author_posts_count = self.post_repo.count_by_author(&post.author_id).await?;
        let comments = self.comment_repo.list_by_post(&post.id).await?;

        let post = self
            .feed
            .decorate(vec![post])
            .await?
            .pop()
            .ok_or_else(|| AppError::PostNotFound(post_id.to_string()))?;

        Ok(PostDetail {
            post,
            comments,
            author_posts_count,
        })
    }

    /// Get a post the user is allowed to change.
    pub async fn get_for_author(&self, user: &user::Model, post_id: &str) -> AppResult<post::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;

        if post.author_id != user.id {
            return Err(AppError::Forbidden("Not the post author".to_string()));
        }

        Ok(post)
    }

    /// Edit a post. Only its author may do so.
    pub async fn update(
        &self,
        user: &user::Model,
        post_id: &str,
        input: PostInput,
    ) -> AppResult<post::Model> {
        let post = self.get_for_author(user, post_id).await?;
        let (text, group_id, image) = self.check_input(input).await?;

        let mut active: post::ActiveModel = post.into();
        active.search_text = Set(post::fold_case(&text));
        active.text = Set(text);
        active.group_id = Set(group_id);
        if image.is_some() {
            active.image = Set(image);
        }

        let post = self.post_repo.update(active).await?;
        tracing::info!(post_id = %post.id, "Updated post");
        Ok(post)
    }

    /// Delete a post. Only its author may do so.
    ///
    /// Returns the author's username.
    pub async fn delete(&self, user: &user::Model, post_id: &str) -> AppResult<String> {
        let post = self.get_for_author(user, post_id).await?;

        self.post_repo.delete(&post.id).await?;

        tracing::info!(post_id = %post.id, author_id = %user.id, "Deleted post");
        Ok(user.username.clone())
    }

    /// Number of posts a user wrote.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        self.post_repo.count_by_author(author_id).await
    }

    async fn check_input(
        &self,
        input: PostInput,
    ) -> AppResult<(String, Option<String>, Option<String>)> {
        input.validate()?;

        if input.text.trim().is_empty() {
            return Err(AppError::Validation("text: must not be blank".to_string()));
        }

        let group_id = match input.group_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => {
                if self.group_repo.find_by_id(&id).await?.is_none() {
                    return Err(AppError::Validation(format!("group: unknown group {id}")));
                }
                Some(id)
            }
            None => None,
        };

        let image = input.image.filter(|path| !path.trim().is_empty());

        Ok((input.text, group_id, image))
    }
}
