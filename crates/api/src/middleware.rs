//! API middleware and shared state.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::DatabaseConnection;
use tera::Tera;
use yatube_common::{AppResult, Config};
use yatube_core::{
    CommentService, FeedService, FollowService, GroupService, LikeService, PageContextService,
    PostService, SearchService, UserService, VisitService,
};
use yatube_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, IpRepository, LikeRepository,
    PostRepository, UserRepository,
};

use crate::render;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<Config>,
    /// Accounts and tokens.
    pub user_service: UserService,
    /// Post lifecycle.
    pub post_service: PostService,
    /// Comments on posts.
    pub comment_service: CommentService,
    /// Groups.
    pub group_service: GroupService,
    /// Paged post listings.
    pub feed_service: FeedService,
    /// Subscriptions between users.
    pub follow_service: FollowService,
    /// Like toggling.
    pub like_service: LikeService,
    /// Post search.
    pub search_service: SearchService,
    /// Visitor and view counting.
    pub visit_service: VisitService,
    /// Data shared by every page.
    pub page_context_service: PageContextService,
    /// Compiled HTML fragments.
    pub templates: Arc<Tera>,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    pub fn new(config: Config, db: Arc<DatabaseConnection>) -> AppResult<Self> {
        let time_zone = config.time_zone()?;

        let user_repo = UserRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));
        let group_repo = GroupRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(Arc::clone(&db));
        let follow_repo = FollowRepository::new(Arc::clone(&db));
        let like_repo = LikeRepository::new(Arc::clone(&db));
        let ip_repo = IpRepository::new(Arc::clone(&db));

        let feed_service = FeedService::new(
            post_repo.clone(),
            user_repo.clone(),
            group_repo.clone(),
            follow_repo.clone(),
            like_repo.clone(),
            config.site.page_size,
        );
        let visit_service = VisitService::new(ip_repo, time_zone);
        let page_context_service = PageContextService::new(
            visit_service.clone(),
            like_repo.clone(),
            config.site.media_url.clone(),
        );

        Ok(Self {
            user_service: UserService::new(user_repo.clone()),
            post_service: PostService::new(
                post_repo.clone(),
                group_repo.clone(),
                comment_repo.clone(),
                feed_service.clone(),
            ),
            comment_service: CommentService::new(comment_repo, post_repo.clone()),
            group_service: GroupService::new(group_repo),
            follow_service: FollowService::new(follow_repo, user_repo),
            like_service: LikeService::new(like_repo, post_repo.clone()),
            search_service: SearchService::new(post_repo, feed_service.clone()),
            templates: Arc::new(render::templates()?),
            config: Arc::new(config),
            feed_service,
            visit_service,
            page_context_service,
        })
    }
}

/// Authentication middleware.
///
/// Resolves a bearer token or the session cookie into the request's user.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    let token = bearer.or_else(|| {
        CookieJar::from_headers(req.headers())
            .get(&state.config.auth.cookie_name)
            .map(|cookie| cookie.value().to_string())
    });

    if let Some(token) = token.filter(|t| !t.is_empty()) {
        match state.user_service.authenticate_by_token(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) if e.is_server_error() => {
                tracing::warn!(error = %e, "Failed to resolve access token");
            }
            Err(_) => {}
        }
    }

    next.run(req).await
}
