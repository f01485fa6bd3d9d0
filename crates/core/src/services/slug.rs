//! URL slugs for channels and content.

use async_trait::async_trait;
use biznetworq_common::{AppResult, IdGenerator};
use biznetworq_db::{
    entities::ContentColumns,
    repositories::{ChannelRepository, ContentRepository},
};

const MAX_SLUG_LEN: usize = 80;
const SUFFIX_ATTEMPTS: usize = 5;

/// A table with a unique slug column.
#[async_trait]
pub trait SlugStore: Send + Sync {
    /// Whether `slug` is already used.
    async fn slug_taken(&self, slug: &str) -> AppResult<bool>;
}

#[async_trait]
impl<E> SlugStore for ContentRepository<E>
where
    E: ContentColumns,
    E::Model: Sync,
{
    async fn slug_taken(&self, slug: &str) -> AppResult<bool> {
        self.slug_exists(slug).await
    }
}

#[async_trait]
impl SlugStore for ChannelRepository {
    async fn slug_taken(&self, slug: &str) -> AppResult<bool> {
        self.slug_exists(slug).await
    }
}

/// Lowercase ASCII slug: runs of anything but letters and digits become `-`.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len().min(MAX_SLUG_LEN));
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
            if slug.len() >= MAX_SLUG_LEN {
                break;
            }
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}

/// Slug for `title` that is not yet used in `store`.
///
/// Collisions get a short random suffix; after a few misses the suffix
/// becomes a full ID.
pub async fn unique_slug<S>(store: &S, id_gen: &IdGenerator, title: &str) -> AppResult<String>
where
    S: SlugStore + ?Sized,
{
    let base = slugify(title);
    if !store.slug_taken(&base).await? {
        return Ok(base);
    }

    for _ in 0..SUFFIX_ATTEMPTS {
        let candidate = format!("{base}-{}", id_gen.generate_suffix());
        if !store.slug_taken(&candidate).await? {
            return Ok(candidate);
        }
    }

    Ok(format!("{base}-{}", id_gen.generate()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct TakenSlugs(Mutex<Vec<String>>);

    #[async_trait]
    impl SlugStore for TakenSlugs {
        async fn slug_taken(&self, slug: &str) -> AppResult<bool> {
            Ok(self.0.lock().unwrap().iter().any(|s| s == slug))
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Scaling Postgres: Part 2"), "scaling-postgres-part-2");
        assert_eq!(slugify("  --Hello,   World!-- "), "hello-world");
        assert_eq!(slugify("Café déjà vu"), "caf-d-j-vu");
        assert_eq!(slugify("!!!"), "untitled");
    }

    #[test]
    fn test_slugify_truncates() {
        let slug = slugify(&"a".repeat(200));
        assert_eq!(slug.len(), MAX_SLUG_LEN);
    }

    #[tokio::test]
    async fn test_unique_slug_free() {
        let store = TakenSlugs(Mutex::new(vec![]));
        let slug = unique_slug(&store, &IdGenerator::new(), "Rust at Acme")
            .await
            .unwrap();
        assert_eq!(slug, "rust-at-acme");
    }

    #[tokio::test]
    async fn test_unique_slug_collision_gets_suffix() {
        let store = TakenSlugs(Mutex::new(vec!["rust-at-acme".to_string()]));
        let slug = unique_slug(&store, &IdGenerator::new(), "Rust at Acme")
            .await
            .unwrap();

        assert!(slug.starts_with("rust-at-acme-"));
        assert_eq!(slug.len(), "rust-at-acme-".len() + 6);
    }
}
