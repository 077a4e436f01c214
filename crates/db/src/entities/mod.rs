//! Database entities.

pub mod comment;
pub mod follow;
pub mod group;
pub mod ip;
pub mod like;
pub mod post;
pub mod post_like;
pub mod post_view;
pub mod user;

pub use comment::Entity as Comment;
pub use follow::Entity as Follow;
pub use group::Entity as Group;
pub use ip::Entity as Ip;
pub use like::Entity as Like;
pub use post::Entity as Post;
pub use post_like::Entity as PostLike;
pub use post_view::Entity as PostView;
pub use user::Entity as User;
