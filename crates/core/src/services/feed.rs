//! Feed queries: paginated post listings decorated for display.

use std::collections::HashMap;

use serde::Serialize;
use yatube_common::{AppError, AppResult};
use yatube_db::entities::{group, post, user};
use yatube_db::repositories::{
    FollowRepository, GroupRepository, LikeRepository, Paged, PostRepository, UserRepository,
};

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number.
    pub number: u64,
    /// Maximum items per page.
    pub page_size: u64,
    /// Number of pages; an empty listing still has one.
    pub num_pages: u64,
    /// Number of items across all pages.
    pub total: u64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_previous: bool,
}

impl<T> Page<T> {
    /// Build a page, rejecting numbers outside `1..=num_pages`.
    pub fn new(items: Vec<T>, number: u64, page_size: u64, total: u64) -> AppResult<Self> {
        let num_pages = num_pages(total, page_size);
        if number == 0 || number > num_pages {
            return Err(AppError::NotFound(format!("page {number}")));
        }

        Ok(Self {
            items,
            number,
            page_size,
            num_pages,
            total,
            has_next: number < num_pages,
            has_previous: number > 1,
        })
    }
}

/// Number of pages needed for `total` items.
#[must_use]
pub fn num_pages(total: u64, page_size: u64) -> u64 {
    total.div_ceil(page_size.max(1)).max(1)
}

/// A post with everything a listing shows next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostView {
    /// The post row.
    #[serde(flatten)]
    pub post: post::Model,
    /// Username of the author.
    pub author_username: String,
    /// Slug of the group, if the post has one.
    pub group_slug: Option<String>,
    /// Distinct visitors that opened the post.
    pub views: u64,
    /// Active likes.
    pub likes: u64,
}

/// A group's feed.
#[derive(Debug, Clone, Serialize)]
pub struct GroupFeed {
    /// The group.
    pub group: group::Model,
    /// Posts of the group.
    pub page: Page<PostView>,
}

/// An author's profile feed.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileFeed {
    /// The author.
    pub author: user::Model,
    /// Number of posts the author wrote.
    pub posts_count: u64,
    /// Whether the viewer follows the author.
    pub following: bool,
    /// Posts of the author.
    pub page: Page<PostView>,
}

/// Feed service building paginated listings.
#[derive(Clone)]
pub struct FeedService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    group_repo: GroupRepository,
    follow_repo: FollowRepository,
    like_repo: LikeRepository,
    page_size: u64,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        group_repo: GroupRepository,
        follow_repo: FollowRepository,
        like_repo: LikeRepository,
        page_size: u64,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            group_repo,
            follow_repo,
            like_repo,
            page_size,
        }
    }

    /// Configured page size.
    #[must_use]
    pub const fn page_size(&self) -> u64 {
        self.page_size
    }

    /// All posts, newest first.
    pub async fn global(&self, page: u64) -> AppResult<Page<PostView>> {
        Self::check_number(page)?;
        let paged = self.post_repo.find_all_page(page, self.page_size).await?;
        self.page_of(paged, page).await
    }

    /// Posts of one group, newest first.
    ///
    /// A group without posts is reported as not found.
    pub async fn group(&self, slug: &str, page: u64) -> AppResult<GroupFeed> {
        Self::check_number(page)?;
        let group = self.group_repo.get_by_slug(slug).await?;

        let paged = self
            .post_repo
            .find_by_group_page(&group.id, page, self.page_size)
            .await?;
        if paged.total == 0 {
            return Err(AppError::GroupNotFound(slug.to_string()));
        }

        let page = self.page_of(paged, page).await?;
        Ok(GroupFeed { group, page })
    }

    /// Posts of one author plus the data shown on the profile.
    pub async fn profile(
        &self,
        username: &str,
        viewer: Option<&user::Model>,
        page: u64,
    ) -> AppResult<ProfileFeed> {
        Self::check_number(page)?;
        let author = self.user_repo.get_by_username(username).await?;

        let following = match viewer {
            Some(viewer) => self.follow_repo.is_following(&viewer.id, &author.id).await?,
            None => false,
        };

        let paged = self
            .post_repo
            .find_by_author_page(&author.id, page, self.page_size)
            .await?;
        let posts_count = paged.total;
        let page = self.page_of(paged, page).await?;

        Ok(ProfileFeed {
            author,
            posts_count,
            following,
            page,
        })
    }

    /// Posts ordered by how many distinct visitors opened them.
    pub async fn most_viewed(&self, page: u64) -> AppResult<Page<PostView>> {
        Self::check_number(page)?;
        let paged = self
            .post_repo
            .find_most_viewed_page(page, self.page_size)
            .await?;
        self.page_of(paged, page).await
    }

    /// Posts by the authors `user` follows, newest first.
    pub async fn follow_feed(&self, user: &user::Model, page: u64) -> AppResult<Page<PostView>> {
        Self::check_number(page)?;
        let authors = self.follow_repo.followed_author_ids(&user.id).await?;
        let paged = self
            .post_repo
            .find_by_authors_page(&authors, page, self.page_size)
            .await?;
        self.page_of(paged, page).await
    }

    /// Attach author, group, view and like data to posts, keeping their order.
    pub async fn decorate(&self, posts: Vec<post::Model>) -> AppResult<Vec<PostView>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<String> = posts.iter().map(|p| p.id.clone()).collect();
        let author_ids = unique(posts.iter().map(|p| p.author_id.clone()));
        let group_ids = unique(posts.iter().filter_map(|p| p.group_id.clone()));

        let usernames: HashMap<String, String> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();
        let slugs: HashMap<String, String> = self
            .group_repo
            .find_by_ids(&group_ids)
            .await?
            .into_iter()
            .map(|g| (g.id, g.slug))
            .collect();
        let views = self.post_repo.view_counts(&post_ids).await?;
        let likes = self.like_repo.like_counts(&post_ids).await?;

        Ok(posts
            .into_iter()
            .map(|post| PostView {
                author_username: usernames.get(&post.author_id).cloned().unwrap_or_default(),
                group_slug: post
                    .group_id
                    .as_ref()
                    .and_then(|id| slugs.get(id).cloned()),
                views: views.get(&post.id).copied().unwrap_or(0),
                likes: likes.get(&post.id).copied().unwrap_or(0),
                post,
            })
            .collect())
    }

    fn check_number(page: u64) -> AppResult<()> {
        if page == 0 {
            return Err(AppError::NotFound("page 0".to_string()));
        }
        Ok(())
    }

    async fn page_of(&self, paged: Paged<post::Model>, number: u64) -> AppResult<Page<PostView>> {
        let Paged { items, total } = paged;
        let items = self.decorate(items).await?;
        Page::new(items, number, self.page_size, total)
    }
}

fn unique(ids: impl Iterator<Item = String>) -> Vec<String> {
    let mut ids: Vec<String> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_num_pages() {
        assert_eq!(num_pages(0, 6), 1);
        assert_eq!(num_pages(6, 6), 1);
        assert_eq!(num_pages(7, 6), 2);
        assert_eq!(num_pages(13, 6), 3);
    }

    #[test]
    fn test_page_of_empty_listing() {
        let page = Page::<u8>::new(Vec::new(), 1, 6, 0).unwrap();

        assert_eq!(page.num_pages, 1);
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn test_page_bounds() {
        assert!(matches!(
            Page::<u8>::new(Vec::new(), 0, 6, 10),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            Page::<u8>::new(Vec::new(), 3, 6, 10),
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            Page::<u8>::new(Vec::new(), 2, 6, 0),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_middle_page_links() {
        let page = Page::new(vec![1, 2], 2, 2, 6).unwrap();

        assert_eq!(page.num_pages, 3);
        assert!(page.has_next);
        assert!(page.has_previous);
    }
}
