//! Full-text-ish post search.

use yatube_common::AppResult;
use yatube_db::repositories::PostRepository;
use yatube_db::repositories::post::LIKE_ESCAPE;

use crate::services::feed::{FeedService, PostView};

/// Search service matching post text against a query in several casings.
#[derive(Clone)]
pub struct SearchService {
    post_repo: PostRepository,
    feed: FeedService,
}

impl SearchService {
    /// Create a new search service.
    #[must_use]
    pub const fn new(post_repo: PostRepository, feed: FeedService) -> Self {
        Self { post_repo, feed }
    }

    /// Posts containing the query, newest first.
    ///
    /// A blank query matches nothing.
    pub async fn search(&self, query: &str) -> AppResult<Vec<PostView>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let patterns = like_patterns(query);
        let posts = self.post_repo.search(&patterns).await?;

        tracing::debug!(query = %query, found = posts.len(), "Searched posts");
        self.feed.decorate(posts).await
    }
}

/// `LIKE` patterns for the query as typed, lower, upper and title case.
#[must_use]
pub fn like_patterns(query: &str) -> Vec<String> {
    let mut variants = vec![
        query.to_string(),
        query.to_lowercase(),
        query.to_uppercase(),
        title_case(query),
    ];
    variants.sort();
    variants.dedup();

    variants
        .into_iter()
        .map(|variant| format!("%{}%", escape_like(&variant)))
        .collect()
}

/// Upper-case the first letter of every word and lower-case the rest.
///
/// Any non-alphabetic character starts a new word.
#[must_use]
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;

    for c in text.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }

    out
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}
