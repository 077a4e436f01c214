//! Data shared by every page.

use serde::Serialize;
use yatube_common::AppResult;
use yatube_db::entities::user;
use yatube_db::repositories::LikeRepository;

use crate::services::visit::{VisitService, VisitStats};

/// Context every page response carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageContext {
    /// Visitor counters.
    pub visits: VisitStats,
    /// Posts the current user likes; empty for anonymous visitors.
    #[serde(rename = "posts_like")]
    pub liked_post_ids: Vec<String>,
    /// Prefix for post images.
    pub media_url: String,
}

/// Builds the shared page context.
#[derive(Clone)]
pub struct PageContextService {
    visits: VisitService,
    like_repo: LikeRepository,
    media_url: String,
}

impl PageContextService {
    /// Create a new page context service.
    #[must_use]
    pub const fn new(visits: VisitService, like_repo: LikeRepository, media_url: String) -> Self {
        Self {
            visits,
            like_repo,
            media_url,
        }
    }

    /// Record the visitor and assemble the context.
    pub async fn build(
        &self,
        address: &str,
        user: Option<&user::Model>,
    ) -> AppResult<PageContext> {
        let visits = self.visits.record(address).await?;

        let liked_post_ids = match user {
            Some(user) => self.like_repo.liked_post_ids(&user.id).await?,
            None => Vec::new(),
        };

        Ok(PageContext {
            visits,
            liked_post_ids,
            media_url: self.media_url.clone(),
        })
    }
}
