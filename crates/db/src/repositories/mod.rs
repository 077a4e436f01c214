//! Repositories: one per aggregate, each wrapping the shared connection.

pub mod comment;
pub mod follow;
pub mod group;
pub mod ip;
pub mod like;
pub mod post;
pub mod user;

pub use comment::CommentRepository;
pub use follow::FollowRepository;
pub use group::GroupRepository;
pub use ip::IpRepository;
pub use like::LikeRepository;
pub use post::PostRepository;
pub use user::UserRepository;

/// One page of rows plus the size of the whole result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paged<T> {
    /// Rows of the requested page.
    pub items: Vec<T>,
    /// Number of rows across all pages.
    pub total: u64,
}

impl<T> Paged<T> {
    /// An empty result set.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}
