//! Group service.

use chrono::Utc;
use regex::Regex;
use sea_orm::Set;
use serde::Deserialize;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;
use validator::Validate;
use yatube_common::{AppError, AppResult, IdGenerator};
use yatube_db::entities::group::{self, SLUG_MAX_LEN};
use yatube_db::repositories::GroupRepository;

#[allow(clippy::expect_used)]
static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("invalid regex"));

/// Input for creating a group.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGroupInput {
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// URL identifier. Left blank, it is derived from the title.
    #[serde(default)]
    #[validate(length(max = 200))]
    pub slug: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

/// Group service for business logic.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub const fn new(group_repo: GroupRepository) -> Self {
        Self {
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a group, deriving the slug from the title when none is given.
    pub async fn create(&self, input: CreateGroupInput) -> AppResult<group::Model> {
        input.validate()?;

        let title = input.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("title: must not be blank".to_string()));
        }

        let slug = match input.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => {
                if !SLUG_RE.is_match(slug) {
                    return Err(AppError::Validation(
                        "slug: only latin letters, digits, '-' and '_' are allowed".to_string(),
                    ));
                }
                slug.to_string()
            }
            _ => slugify(&transliterate(title)),
        };

        if slug.is_empty() {
            return Err(AppError::Validation(
                "slug: could not be derived from the title".to_string(),
            ));
        }

        if self.group_repo.slug_exists(&slug).await? {
            return Err(AppError::Conflict(format!("group slug {slug} already exists")));
        }

        let model = group::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(title.to_string()),
            slug: Set(slug),
            description: Set(input.description),
            created_at: Set(Utc::now().into()),
        };

        let group = self.group_repo.create(model).await?;
        tracing::info!(group_id = %group.id, slug = %group.slug, "Created group");
        Ok(group)
    }

    /// All groups, alphabetically.
    pub async fn list(&self) -> AppResult<Vec<group::Model>> {
        self.group_repo.list().await
    }

    /// Get a group by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<group::Model> {
        self.group_repo.get_by_slug(slug).await
    }
}

/// Replace Cyrillic letters with their Latin counterparts.
#[must_use]
pub fn transliterate(text: &str) -> String {
    text.chars()
        .map(|c| match c.to_lowercase().next().unwrap_or(c) {
            'а' => "a",
            'б' => "b",
            'в' => "v",
            'г' => "g",
            'д' => "d",
            'е' | 'ё' | 'э' => "e",
            'ж' | 'й' => "j",
            'з' | 'ц' => "z",
            'и' => "i",
            'к' => "k",
            'л' => "l",
            'м' => "m",
            'н' => "n",
            'о' => "o",
            'п' => "p",
            'р' => "r",
            'с' | 'ш' | 'щ' => "s",
            'т' => "t",
            'у' | 'ю' => "u",
            'ф' => "f",
            'х' => "h",
            'ч' => "c",
            'ъ' | 'ь' => "_",
            'ы' => "y",
            'я' => "a",
            _ => return c.to_string(),
        }
        .to_string())
        .collect()
}

/// Turn text into a URL slug.
///
/// Decomposes accented letters (NFKD) and drops what is still not ASCII.
/// Then lowercases, keeps alphanumerics and `_`, joins words with a single
/// `-`, trims `-`/`_` from both ends and caps the length.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text
        .nfkd()
        .filter(char::is_ascii)
        .map(|c| c.to_ascii_lowercase())
    {
        if c.is_ascii_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c == '-' || c.is_whitespace() {
            pending_dash = true;
        }
    }

    let trimmed = slug.trim_matches(|c| c == '-' || c == '_');
    let mut slug: String = trimmed.chars().take(SLUG_MAX_LEN).collect();
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transliterate_cyrillic() {
        assert_eq!(transliterate("Коты"), "koty");
        assert_eq!(transliterate("ёжик"), "ejik");
        assert_eq!(transliterate("Объявление"), "ob_avlenie");
        assert_eq!(transliterate("Cats"), "Cats");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("Hello   World"), "hello-world");
        assert_eq!(slugify("a - b -- c"), "a-b-c");
        assert_eq!(slugify("  -_Rust_- "), "rust");
        assert_eq!(slugify("100% sure!"), "100-sure");
    }

    #[test]
    fn test_slugify_drops_untransliterated_letters() {
        assert_eq!(slugify("naïve café"), "naive-cafe");
        assert_eq!(slugify("Café Naïve"), "cafe-naive");
        assert_eq!(slugify("Straße 東京"), "strae");
    }

    #[test]
    fn test_slug_from_cyrillic_title() {
        assert_eq!(slugify(&transliterate("Мои Коты")), "moi-koty");
    }

    #[test]
    fn test_slugify_caps_length() {
        let long = "x".repeat(SLUG_MAX_LEN + 50);
        assert_eq!(slugify(&long).len(), SLUG_MAX_LEN);
    }
}
