use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Comment, CommentEntry, Location, Post, PostEntry, User};
use crate::error::RepoError;
use crate::pagination::{Page, PageRequest};
use crate::policy;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Store a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity; `RepoError::NotFound` if it is gone.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID, together with everything it owns.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// All categories, ordered by title.
    async fn list(&self) -> Result<Vec<Category>, RepoError>;
}

#[async_trait]
pub trait LocationRepository: BaseRepository<Location, Uuid> {
    /// All locations, ordered by name.
    async fn list(&self) -> Result<Vec<Location>, RepoError>;
}

/// Which posts a query may return.
///
/// Every field narrows the result; the default matches every post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    /// Restrict to posts publicly visible at this instant.
    pub visible_at: Option<DateTime<Utc>>,
}

impl PostFilter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Posts anyone may see at `now`.
    pub fn published(now: DateTime<Utc>) -> Self {
        Self {
            visible_at: Some(now),
            ..Self::default()
        }
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn in_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// In-process evaluation, for stores that cannot push the filter down.
    pub fn matches(&self, post: &Post, category: Option<&Category>) -> bool {
        self.author_id.is_none_or(|id| post.author_id == id)
            && self.category_id.is_none_or(|id| post.category_id == Some(id))
            && self
                .visible_at
                .is_none_or(|now| policy::is_publicly_visible(post, category, now))
    }
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// A single post with its author, category, location and comment count,
    /// or `None` if it does not exist or does not pass `filter`.
    async fn find_entry(&self, id: Uuid, filter: PostFilter)
    -> Result<Option<PostEntry>, RepoError>;

    /// Posts passing `filter`, newest `pub_date` first.
    async fn list_entries(
        &self,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostEntry>, RepoError>;
}

#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments on a post, oldest first, with their authors.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError>;
}
