//! Business logic services.

pub mod comment;
pub mod feed;
pub mod follow;
pub mod group;
pub mod like;
pub mod page_context;
pub mod post;
pub mod search;
pub mod user;
pub mod visit;

pub use comment::{CommentInput, CommentService};
pub use feed::{FeedService, GroupFeed, Page, PostView, ProfileFeed};
pub use follow::FollowService;
pub use group::{CreateGroupInput, GroupService};
pub use like::{LikeService, LikeToggle};
pub use page_context::{PageContext, PageContextService};
pub use post::{PostDetail, PostInput, PostService};
pub use search::SearchService;
pub use user::{RegisterInput, UserService};
pub use visit::{VisitService, VisitStats};
