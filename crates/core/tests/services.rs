//! Service behaviour against a migrated in-memory `SQLite` database.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use yatube_common::AppError;
use yatube_core::{
    CommentInput, CommentService, CreateGroupInput, FeedService, FollowService, GroupService,
    LikeService, PageContextService, PostInput, PostService, RegisterInput, SearchService,
    UserService, VisitService,
};
use yatube_db::entities::user;
use yatube_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, IpRepository, LikeRepository,
    PostRepository, UserRepository,
};
use yatube_db::test_utils::memory_database;

struct Services {
    users: UserService,
    posts: PostService,
    comments: CommentService,
    groups: GroupService,
    feed: FeedService,
    follows: FollowService,
    likes: LikeService,
    search: SearchService,
    visits: VisitService,
    pages: PageContextService,
}

async fn services() -> Services {
    let db = Arc::new(memory_database().await.unwrap());

    let user_repo = UserRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let comment_repo = CommentRepository::new(Arc::clone(&db));
    let follow_repo = FollowRepository::new(Arc::clone(&db));
    let like_repo = LikeRepository::new(Arc::clone(&db));
    let ip_repo = IpRepository::new(Arc::clone(&db));

    let feed = FeedService::new(
        post_repo.clone(),
        user_repo.clone(),
        group_repo.clone(),
        follow_repo.clone(),
        like_repo.clone(),
        6,
    );
    let visits = VisitService::new(ip_repo, chrono_tz::Europe::Moscow);

    Services {
        users: UserService::new(user_repo.clone()),
        posts: PostService::new(
            post_repo.clone(),
            group_repo.clone(),
            comment_repo.clone(),
            feed.clone(),
        ),
        comments: CommentService::new(comment_repo, post_repo.clone()),
        groups: GroupService::new(group_repo),
        follows: FollowService::new(follow_repo, user_repo),
        likes: LikeService::new(like_repo.clone(), post_repo.clone()),
        search: SearchService::new(post_repo, feed.clone()),
        pages: PageContextService::new(visits.clone(), like_repo, "/media/".to_string()),
        visits,
        feed,
    }
}

async fn register(s: &Services, username: &str) -> user::Model {
    s.users
        .register(RegisterInput {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: "password123".to_string(),
        })
        .await
        .unwrap()
}

fn text(text: &str) -> PostInput {
    PostInput {
        text: text.to_string(),
        group_id: None,
        image: None,
    }
}

#[tokio::test]
async fn test_creating_post_bumps_count_and_leads_global_feed() {
    let s = services().await;
    let author = register(&s, "leo").await;
    s.posts.create(&author, text("first")).await.unwrap();

    let before = s.posts.count_by_author(&author.id).await.unwrap();
    let post = s.posts.create(&author, text("second")).await.unwrap();
    let after = s.posts.count_by_author(&author.id).await.unwrap();

    assert_eq!(after, before + 1);

    let feed = s.feed.global(1).await.unwrap();
    assert_eq!(feed.items[0].post.id, post.id);
    assert_eq!(feed.items[0].author_username, "leo");
    assert_eq!(feed.total, 2);
}

#[tokio::test]
async fn test_blank_post_is_rejected() {
    let s = services().await;
    let author = register(&s, "leo").await;

    let result = s.posts.create(&author, text("   ")).await;

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(s.posts.count_by_author(&author.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_post_with_unknown_group_is_rejected() {
    let s = services().await;
    let author = register(&s, "leo").await;

    let mut input = text("hello");
    input.group_id = Some("nope".to_string());

    assert!(matches!(
        s.posts.create(&author, input).await,
        Err(AppError::Validation(_))
    ));
}

#[tokio::test]
async fn test_only_author_deletes_post() {
    let s = services().await;
    let author = register(&s, "leo").await;
    let stranger = register(&s, "mia").await;
    let post = s.posts.create(&author, text("mine")).await.unwrap();

    let denied = s.posts.delete(&stranger, &post.id).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));
    assert_eq!(s.posts.count_by_author(&author.id).await.unwrap(), 1);

    let username = s.posts.delete(&author, &post.id).await.unwrap();
    assert_eq!(username, "leo");
    assert_eq!(s.posts.count_by_author(&author.id).await.unwrap(), 0);
    assert!(matches!(
        s.posts.detail(&post.id).await,
        Err(AppError::PostNotFound(_))
    ));
}

#[tokio::test]
async fn test_only_author_edits_post() {
    let s = services().await;
    let author = register(&s, "leo").await;
    let stranger = register(&s, "mia").await;
    let post = s.posts.create(&author, text("draft")).await.unwrap();

    assert!(matches!(
        s.posts.update(&stranger, &post.id, text("hijack")).await,
        Err(AppError::Forbidden(_))
    ));

    let updated = s.posts.update(&author, &post.id, text("final")).await.unwrap();
    assert_eq!(updated.text, "final");
    assert_eq!(updated.pub_date, post.pub_date);
}

#[tokio::test]
async fn test_comments_are_listed_newest_first() {
    let s = services().await;
    let author = register(&s, "leo").await;
    let post = s.posts.create(&author, text("post")).await.unwrap();

    for body in ["one", "two"] {
        s.comments
            .create(
                &author,
                &post.id,
                CommentInput {
                    text: body.to_string(),
                },
            )
            .await
            .unwrap();
    }

    let detail = s.posts.detail(&post.id).await.unwrap();
    let bodies: Vec<_> = detail.comments.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(bodies, ["two", "one"]);
    assert_eq!(s.comments.list_for_post(&post.id).await.unwrap().len(), 2);

    let missing = s
        .comments
        .create(
            &author,
            "missing",
            CommentInput {
                text: "hi".to_string(),
            },
        )
        .await;
    assert!(matches!(missing, Err(AppError::PostNotFound(_))));
}

#[tokio::test]
async fn test_follow_feed_shows_exactly_followed_authors() {
    let s = services().await;
    let reader = register(&s, "reader").await;
    let writer = register(&s, "writer").await;
    let other = register(&s, "other").await;
    let outsider = register(&s, "outsider").await;

    let older = s.posts.create(&writer, text("older")).await.unwrap();
    s.posts.create(&other, text("noise")).await.unwrap();
    let newer = s.posts.create(&writer, text("newer")).await.unwrap();

    s.follows.follow(&reader, "writer").await.unwrap();
    s.follows.follow(&reader, "writer").await.unwrap();

    let feed = s.feed.follow_feed(&reader, 1).await.unwrap();
    let ids: Vec<_> = feed.items.iter().map(|v| v.post.id.clone()).collect();
    assert_eq!(ids, [newer.id, older.id]);

    let empty = s.feed.follow_feed(&outsider, 1).await.unwrap();
    assert!(empty.items.is_empty());
    assert_eq!(empty.num_pages, 1);
}

#[tokio::test]
async fn test_follow_edge_rules() {
    let s = services().await;
    let reader = register(&s, "reader").await;
    let writer = register(&s, "writer").await;

    s.follows.follow(&reader, "reader").await.unwrap();
    assert!(!s.follows.is_following(&reader.id, &reader.id).await.unwrap());

    assert!(matches!(
        s.follows.follow(&reader, "ghost").await,
        Err(AppError::UserNotFound(_))
    ));
    assert!(matches!(
        s.follows.unfollow(&reader, "writer").await,
        Err(AppError::NotFound(_))
    ));

    s.follows.follow(&reader, "writer").await.unwrap();
    let profile = s.feed.profile("writer", Some(&reader), 1).await.unwrap();
    assert!(profile.following);

    s.follows.unfollow(&reader, "writer").await.unwrap();
    assert!(!s.follows.is_following(&reader.id, &writer.id).await.unwrap());
}

#[tokio::test]
async fn test_toggling_like_twice_restores_count() {
    let s = services().await;
    let author = register(&s, "leo").await;
    let fan = register(&s, "fan").await;
    let post = s.posts.create(&author, text("likeable")).await.unwrap();

    let original = s.likes.like_count(&post.id).await.unwrap();

    let first = s.likes.toggle(&fan, &post.id, false).await.unwrap();
    assert!(!first.result);
    assert_eq!(first.like_count, original + 1);
    assert_eq!(
        s.likes.liked_post_ids(&fan.id).await.unwrap(),
        vec![post.id.clone()]
    );

    let second = s.likes.toggle(&fan, &post.id, true).await.unwrap();
    assert!(second.result);
    assert_eq!(second.like_count, original);
    assert!(s.likes.liked_post_ids(&fan.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_new_like_row_stores_negated_client_flag() {
    let s = services().await;
    let author = register(&s, "leo").await;
    let post = s.posts.create(&author, text("likeable")).await.unwrap();

    let toggle = s.likes.toggle(&author, &post.id, true).await.unwrap();

    assert!(toggle.result);
    assert_eq!(toggle.like_count, 0);
}

#[tokio::test]
async fn test_like_on_missing_post_fails() {
    let s = services().await;
    let fan = register(&s, "fan").await;

    assert!(matches!(
        s.likes.toggle(&fan, "missing", false).await,
        Err(AppError::PostNotFound(_))
    ));
}

#[tokio::test]
async fn test_search_matches_any_casing() {
    let s = services().await;
    let author = register(&s, "leo").await;
    let post = s
        .posts
        .create(&author, text("Hello World from Rust"))
        .await
        .unwrap();

    for query in ["hello", "HELLO", "hello world", "World"] {
        let found = s.search.search(query).await.unwrap();
        assert_eq!(found.len(), 1, "query {query:?}");
        assert_eq!(found[0].post.id, post.id);
    }

    assert!(s.search.search("absent").await.unwrap().is_empty());
    assert!(s.search.search("").await.unwrap().is_empty());
    assert!(s.search.search("   ").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_ignores_mixed_case_text() {
    let s = services().await;
    let author = register(&s, "leo").await;
    let cyrillic = s.posts.create(&author, text("пРиВет мир")).await.unwrap();
    let ascii = s.posts.create(&author, text("mIxEd case")).await.unwrap();

    let found = s.search.search("привет").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].post.id, cyrillic.id);

    let found = s.search.search("MIXED").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].post.id, ascii.id);
}

#[tokio::test]
async fn test_search_follows_edited_text() {
    let s = services().await;
    let author = register(&s, "leo").await;
    let post = s.posts.create(&author, text("Старый текст")).await.unwrap();

    s.posts
        .update(&author, &post.id, text("Новый Текст"))
        .await
        .unwrap();

    assert!(s.search.search("старый").await.unwrap().is_empty());
    assert_eq!(s.search.search("НОВЫЙ").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_group_slug_derivation_and_collision() {
    let s = services().await;

    let group = s
        .groups
        .create(CreateGroupInput {
            title: "Мои Коты".to_string(),
            slug: Some(String::new()),
            description: "cats".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(group.slug, "moi-koty");

    let clash = s
        .groups
        .create(CreateGroupInput {
            title: "Other".to_string(),
            slug: Some("moi-koty".to_string()),
            description: String::new(),
        })
        .await;
    assert!(matches!(clash, Err(AppError::Conflict(_))));
    assert_eq!(s.groups.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_group_slug_decomposes_accents() {
    let s = services().await;

    let group = s
        .groups
        .create(CreateGroupInput {
            title: "Café Naïve".to_string(),
            slug: None,
            description: String::new(),
        })
        .await
        .unwrap();

    assert_eq!(group.slug, "cafe-naive");
}

#[tokio::test]
async fn test_group_rejects_unsafe_explicit_slug() {
    let s = services().await;

    for slug in ["a b/c", "кошки", "cats?"] {
        let result = s
            .groups
            .create(CreateGroupInput {
                title: "Cats".to_string(),
                slug: Some(slug.to_string()),
                description: String::new(),
            })
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))), "slug {slug:?}");
    }

    assert!(s.groups.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_group_feed_is_not_found() {
    let s = services().await;
    let author = register(&s, "leo").await;
    let group = s
        .groups
        .create(CreateGroupInput {
            title: "Cats".to_string(),
            slug: None,
            description: String::new(),
        })
        .await
        .unwrap();

    assert!(matches!(
        s.feed.group("cats", 1).await,
        Err(AppError::GroupNotFound(_))
    ));
    assert!(matches!(
        s.feed.group("dogs", 1).await,
        Err(AppError::GroupNotFound(_))
    ));

    let mut input = text("meow");
    input.group_id = Some(group.id.clone());
    s.posts.create(&author, input).await.unwrap();

    let feed = s.feed.group("cats", 1).await.unwrap();
    assert_eq!(feed.page.items.len(), 1);
    assert_eq!(feed.page.items[0].group_slug.as_deref(), Some("cats"));
}

#[tokio::test]
async fn test_pagination_bounds() {
    let s = services().await;
    let author = register(&s, "leo").await;
    for i in 0..7 {
        s.posts.create(&author, text(&format!("post {i}"))).await.unwrap();
    }

    let first = s.feed.global(1).await.unwrap();
    assert_eq!(first.items.len(), 6);
    assert_eq!(first.num_pages, 2);
    assert!(first.has_next);

    let second = s.feed.global(2).await.unwrap();
    assert_eq!(second.items.len(), 1);
    assert!(second.has_previous);

    assert!(matches!(s.feed.global(0).await, Err(AppError::NotFound(_))));
    assert!(matches!(s.feed.global(3).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_visits_count_distinct_addresses() {
    let s = services().await;

    let first = s.visits.record("10.0.0.1").await.unwrap();
    assert_eq!(first.total, 1);
    assert_eq!(first.today, 1);

    let again = s.visits.record("10.0.0.1").await.unwrap();
    assert_eq!(again.total, 1);

    let other = s.visits.record("10.0.0.2").await.unwrap();
    assert_eq!(other.total, 2);
    assert_eq!(other.today, 2);
}

#[tokio::test]
async fn test_views_drive_most_viewed_feed() {
    let s = services().await;
    let author = register(&s, "leo").await;
    let quiet = s.posts.create(&author, text("quiet")).await.unwrap();
    let popular = s.posts.create(&author, text("popular")).await.unwrap();
    let newest = s.posts.create(&author, text("newest")).await.unwrap();

    s.visits.record_view(&popular.id, "10.0.0.1").await.unwrap();
    s.visits.record_view(&popular.id, "10.0.0.2").await.unwrap();
    s.visits.record_view(&popular.id, "10.0.0.2").await.unwrap();
    s.visits.record_view(&quiet.id, "10.0.0.1").await.unwrap();

    let feed = s.feed.most_viewed(1).await.unwrap();
    let ids: Vec<_> = feed.items.iter().map(|v| v.post.id.clone()).collect();
    assert_eq!(ids, [popular.id.clone(), quiet.id, newest.id]);
    assert_eq!(feed.items[0].views, 2);
}

#[tokio::test]
async fn test_page_context_lists_likes_for_users_only() {
    let s = services().await;
    let author = register(&s, "leo").await;
    let post = s.posts.create(&author, text("likeable")).await.unwrap();
    s.likes.toggle(&author, &post.id, false).await.unwrap();

    let anonymous = s.pages.build("10.0.0.9", None).await.unwrap();
    assert!(anonymous.liked_post_ids.is_empty());
    assert_eq!(anonymous.media_url, "/media/");
    assert_eq!(anonymous.visits.total, 1);

    let signed_in = s.pages.build("10.0.0.9", Some(&author)).await.unwrap();
    assert_eq!(signed_in.liked_post_ids, vec![post.id]);
}

#[tokio::test]
async fn test_auth_roundtrip() {
    let s = services().await;
    let user = register(&s, "leo").await;
    let token = user.token.clone().unwrap();

    let by_token = s.users.authenticate_by_token(&token).await.unwrap();
    assert_eq!(by_token.id, user.id);

    let logged_in = s.users.authenticate("leo", "password123").await.unwrap();
    assert_eq!(logged_in.id, user.id);
    assert!(matches!(
        s.users.authenticate("leo", "wrong-password").await,
        Err(AppError::Unauthorized)
    ));

    s.users.logout(&user).await.unwrap();
    assert!(matches!(
        s.users.authenticate_by_token(&token).await,
        Err(AppError::Unauthorized)
    ));

    let duplicate = s
        .users
        .register(RegisterInput {
            username: "leo".to_string(),
            email: "again@example.com".to_string(),
            password: "password123".to_string(),
        })
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}
