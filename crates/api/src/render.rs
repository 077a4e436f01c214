//! HTML fragments returned inside JSON payloads.

use tera::{Context, Tera};
use yatube_common::{AppError, AppResult};
use yatube_core::PostView;

const SEARCH_TEMPLATE: &str = r#"{% for post in posts %}<article class="search-result">
  <a href="/posts/{{ post.id }}/">{{ post.text | truncate(length=120) }}</a>
  <p class="search-meta">
    <a href="/profile/{{ post.author_username }}/">{{ post.author_username }}</a>
    {% if post.group_slug %}<a href="/group/{{ post.group_slug }}/">#{{ post.group_slug }}</a>{% endif %}
    <time datetime="{{ post.pub_date }}">{{ post.pub_date | date(format="%d.%m.%Y %H:%M") }}</time>
  </p>
</article>
{% endfor %}"#;

/// Build the template registry.
pub fn templates() -> AppResult<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_template("search.html", SEARCH_TEMPLATE)
        .map_err(|e| AppError::Template(e.to_string()))?;
    Ok(tera)
}

/// Render search results as an HTML fragment.
pub fn search_results(tera: &Tera, posts: &[PostView]) -> AppResult<String> {
    let mut context = Context::new();
    context.insert("posts", posts);

    tera.render("search.html", &context)
        .map_err(|e| AppError::Template(e.to_string()))
}
