//! In-memory store - used when no database is configured, and in tests.
//!
//! Enforces the same constraints as the SQL schema: unique usernames and
//! slugs, existing parents on insert, and the delete cascades that
//! PostgreSQL gets from `ON DELETE CASCADE` / `SET NULL`.
//! Note: Data is lost on process restart.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, CommentEntry, Location, Post, PostEntry, User};
use blogicum_core::error::RepoError;
use blogicum_core::pagination::{Page, PageRequest};
use blogicum_core::ports::{
    BaseRepository, CategoryRepository, CommentRepository, LocationRepository, PostFilter,
    PostRepository, Repositories, UserRepository,
};

/// Every table of the store, behind one lock so cascades are atomic.
#[derive(Default)]
pub struct MemoryTables {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    locations: HashMap<Uuid, Location>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

/// A domain record that lives in one of the [`MemoryTables`].
pub trait MemoryRecord: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;

    fn table(tables: &MemoryTables) -> &HashMap<Uuid, Self>;

    fn table_mut(tables: &mut MemoryTables) -> &mut HashMap<Uuid, Self>;

    /// Unique and foreign key checks run before every write.
    fn check_constraints(&self, _tables: &MemoryTables) -> Result<(), RepoError> {
        Ok(())
    }

    /// Clean up rows that depend on the deleted record.
    fn cascade(_tables: &mut MemoryTables, _id: Uuid) {}
}

impl MemoryRecord for User {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &MemoryTables) -> &HashMap<Uuid, Self> {
        &tables.users
    }

    fn table_mut(tables: &mut MemoryTables) -> &mut HashMap<Uuid, Self> {
        &mut tables.users
    }

    fn check_constraints(&self, tables: &MemoryTables) -> Result<(), RepoError> {
        let taken = tables
            .users
            .values()
            .any(|u| u.id != self.id && u.username == self.username);
        if taken {
            return Err(RepoError::Constraint(format!(
                "username '{}' already exists",
                self.username
            )));
        }
        Ok(())
    }

    fn cascade(tables: &mut MemoryTables, id: Uuid) {
        let owned: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in owned {
            tables.posts.remove(&post_id);
            Post::cascade(tables, post_id);
        }
        tables.comments.retain(|_, c| c.author_id != id);
    }
}

impl MemoryRecord for Category {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &MemoryTables) -> &HashMap<Uuid, Self> {
        &tables.categories
    }

    fn table_mut(tables: &mut MemoryTables) -> &mut HashMap<Uuid, Self> {
        &mut tables.categories
    }

    fn check_constraints(&self, tables: &MemoryTables) -> Result<(), RepoError> {
        let taken = tables
            .categories
            .values()
            .any(|c| c.id != self.id && c.slug == self.slug);
        if taken {
            return Err(RepoError::Constraint(format!(
                "slug '{}' already exists",
                self.slug
            )));
        }
        Ok(())
    }

    fn cascade(tables: &mut MemoryTables, id: Uuid) {
        for post in tables.posts.values_mut() {
            if post.category_id == Some(id) {
                post.category_id = None;
            }
        }
    }
}

impl MemoryRecord for Location {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &MemoryTables) -> &HashMap<Uuid, Self> {
        &tables.locations
    }

    fn table_mut(tables: &mut MemoryTables) -> &mut HashMap<Uuid, Self> {
        &mut tables.locations
    }

    fn cascade(tables: &mut MemoryTables, id: Uuid) {
        for post in tables.posts.values_mut() {
            if post.location_id == Some(id) {
                post.location_id = None;
            }
        }
    }
}

impl MemoryRecord for Post {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &MemoryTables) -> &HashMap<Uuid, Self> {
        &tables.posts
    }

    fn table_mut(tables: &mut MemoryTables) -> &mut HashMap<Uuid, Self> {
        &mut tables.posts
    }

    fn check_constraints(&self, tables: &MemoryTables) -> Result<(), RepoError> {
        if !tables.users.contains_key(&self.author_id) {
            return Err(RepoError::Constraint("post author does not exist".into()));
        }
        if self
            .category_id
            .is_some_and(|id| !tables.categories.contains_key(&id))
        {
            return Err(RepoError::Constraint("post category does not exist".into()));
        }
        if self
            .location_id
            .is_some_and(|id| !tables.locations.contains_key(&id))
        {
            return Err(RepoError::Constraint("post location does not exist".into()));
        }
        Ok(())
    }

    fn cascade(tables: &mut MemoryTables, id: Uuid) {
        tables.comments.retain(|_, c| c.post_id != id);
    }
}

impl MemoryRecord for Comment {
    fn id(&self) -> Uuid {
        self.id
    }

    fn table(tables: &MemoryTables) -> &HashMap<Uuid, Self> {
        &tables.comments
    }

    fn table_mut(tables: &mut MemoryTables) -> &mut HashMap<Uuid, Self> {
        &mut tables.comments
    }

    fn check_constraints(&self, tables: &MemoryTables) -> Result<(), RepoError> {
        if !tables.posts.contains_key(&self.post_id) {
            return Err(RepoError::Constraint("comment post does not exist".into()));
        }
        if !tables.users.contains_key(&self.author_id) {
            return Err(RepoError::Constraint("comment author does not exist".into()));
        }
        Ok(())
    }
}

/// Shared handle to the in-memory tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<MemoryTables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository for one record type over this store.
    pub fn repository<T: MemoryRecord>(&self) -> InMemoryRepository<T> {
        InMemoryRepository {
            tables: self.tables.clone(),
            _record: PhantomData,
        }
    }

    /// Repository handles over this store.
    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(self.repository::<User>()),
            categories: Arc::new(self.repository::<Category>()),
            locations: Arc::new(self.repository::<Location>()),
            posts: Arc::new(self.repository::<Post>()),
            comments: Arc::new(self.repository::<Comment>()),
        }
    }
}

/// Generic in-memory repository, the counterpart of `PostgresBaseRepository`.
pub struct InMemoryRepository<T> {
    tables: Arc<RwLock<MemoryTables>>,
    _record: PhantomData<fn() -> T>,
}

pub type InMemoryUserRepository = InMemoryRepository<User>;
pub type InMemoryCategoryRepository = InMemoryRepository<Category>;
pub type InMemoryLocationRepository = InMemoryRepository<Location>;
pub type InMemoryPostRepository = InMemoryRepository<Post>;
pub type InMemoryCommentRepository = InMemoryRepository<Comment>;

#[async_trait]
impl<T: MemoryRecord> BaseRepository<T, Uuid> for InMemoryRepository<T> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, RepoError> {
        let tables = self.tables.read().await;
        Ok(T::table(&tables).get(&id).cloned())
    }

    async fn insert(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if T::table(&tables).contains_key(&entity.id()) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }
        entity.check_constraints(&tables)?;
        T::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: T) -> Result<T, RepoError> {
        let mut tables = self.tables.write().await;
        if !T::table(&tables).contains_key(&entity.id()) {
            return Err(RepoError::NotFound);
        }
        entity.check_constraints(&tables)?;
        T::table_mut(&mut tables).insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if T::table_mut(&mut tables).remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }
        T::cascade(&mut tables, id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(categories)
    }
}

#[async_trait]
impl LocationRepository for InMemoryLocationRepository {
    async fn list(&self) -> Result<Vec<Location>, RepoError> {
        let tables = self.tables.read().await;
        let mut locations: Vec<Location> = tables.locations.values().cloned().collect();
        locations.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locations)
    }
}

impl MemoryTables {
    fn category_of(&self, post: &Post) -> Option<&Category> {
        post.category_id.and_then(|id| self.categories.get(&id))
    }

    fn entry(&self, post: &Post) -> Result<PostEntry, RepoError> {
        let author = self
            .users
            .get(&post.author_id)
            .ok_or_else(|| RepoError::Query(format!("post {} has no author", post.id)))?;
        let comment_count = self
            .comments
            .values()
            .filter(|c| c.post_id == post.id)
            .count() as u64;

        Ok(PostEntry {
            post: post.clone(),
            author: author.profile(),
            category: self.category_of(post).cloned(),
            location: post.location_id.and_then(|id| self.locations.get(&id).cloned()),
            comment_count,
        })
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn find_entry(
        &self,
        id: Uuid,
        filter: PostFilter,
    ) -> Result<Option<PostEntry>, RepoError> {
        let tables = self.tables.read().await;
        match tables.posts.get(&id) {
            Some(post) if filter.matches(post, tables.category_of(post)) => {
                tables.entry(post).map(Some)
            }
            _ => Ok(None),
        }
    }

    async fn list_entries(
        &self,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostEntry>, RepoError> {
        let tables = self.tables.read().await;

        let mut matching: Vec<&Post> = tables
            .posts
            .values()
            .filter(|p| filter.matches(p, tables.category_of(p)))
            .collect();
        matching.sort_by(|a, b| {
            b.pub_date
                .cmp(&a.pub_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });

        let total = matching.len() as u64;
        let entries = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.per_page as usize)
            .map(|p| tables.entry(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(entries, page, total))
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError> {
        let tables = self.tables.read().await;

        let mut comments: Vec<&Comment> = tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .collect();
        comments.sort_by_key(|c| c.created_at);

        comments
            .into_iter()
            .map(|c| {
                let author = tables.users.get(&c.author_id).ok_or_else(|| {
                    RepoError::Query(format!("comment {} has no author", c.id))
                })?;
                Ok(CommentEntry {
                    comment: c.clone(),
                    author: author.profile(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    async fn seed_user(store: &InMemoryStore, username: &str) -> User {
        store
            .repository::<User>()
            .insert(User::new(username.into(), String::new(), "hash".into()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let store = InMemoryStore::new();
        seed_user(&store, "anna").await;

        let result = store
            .repository::<User>()
            .insert(User::new("anna".into(), String::new(), "hash".into()))
            .await;

        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_post_requires_existing_author() {
        let store = InMemoryStore::new();
        let post = Post::new(Uuid::new_v4(), "T".into(), "X".into(), Utc::now());

        let result = store.repository::<Post>().insert(post).await;
        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_deleting_post_deletes_its_comments() {
        let store = InMemoryStore::new();
        let repos = store.repositories();
        let author = seed_user(&store, "anna").await;
        let reader = seed_user(&store, "boris").await;

        let post = repos
            .posts
            .insert(Post::new(author.id, "T".into(), "X".into(), Utc::now()))
            .await
            .unwrap();
        let comment = repos
            .comments
            .insert(Comment::new(post.id, reader.id, "Nice".into()))
            .await
            .unwrap();

        repos.posts.delete(post.id).await.unwrap();

        assert!(repos.comments.find_by_id(comment.id).await.unwrap().is_none());
        assert!(repos.comments.list_for_post(post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleting_user_removes_their_posts_and_comments() {
        let store = InMemoryStore::new();
        let repos = store.repositories();
        let author = seed_user(&store, "anna").await;
        let reader = seed_user(&store, "boris").await;

        let post = repos
            .posts
            .insert(Post::new(author.id, "T".into(), "X".into(), Utc::now()))
            .await
            .unwrap();
        let reader_post = repos
            .posts
            .insert(Post::new(reader.id, "R".into(), "Y".into(), Utc::now()))
            .await
            .unwrap();
        repos
            .comments
            .insert(Comment::new(post.id, reader.id, "Nice".into()))
            .await
            .unwrap();
        let anna_comment = repos
            .comments
            .insert(Comment::new(reader_post.id, author.id, "Thanks".into()))
            .await
            .unwrap();

        repos.users.delete(author.id).await.unwrap();

        assert!(repos.posts.find_by_id(post.id).await.unwrap().is_none());
        assert!(repos.comments.find_by_id(anna_comment.id).await.unwrap().is_none());
        assert!(repos.posts.find_by_id(reader_post.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_deleting_category_detaches_posts() {
        let store = InMemoryStore::new();
        let repos = store.repositories();
        let author = seed_user(&store, "anna").await;
        let category = repos
            .categories
            .insert(Category::new("Travel".into(), String::new(), "travel".into()))
            .await
            .unwrap();

        let mut post = Post::new(author.id, "T".into(), "X".into(), Utc::now());
        post.category_id = Some(category.id);
        let post = repos.posts.insert(post).await.unwrap();

        repos.categories.delete(category.id).await.unwrap();

        let post = repos.posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(post.category_id, None);
    }

    #[tokio::test]
    async fn test_list_entries_orders_and_counts() {
        let store = InMemoryStore::new();
        let repos = store.repositories();
        let author = seed_user(&store, "anna").await;
        let now = Utc::now();

        let older = repos
            .posts
            .insert(Post::new(author.id, "Old".into(), "X".into(), now - Duration::days(2)))
            .await
            .unwrap();
        let newer = repos
            .posts
            .insert(Post::new(author.id, "New".into(), "X".into(), now - Duration::days(1)))
            .await
            .unwrap();
        repos
            .comments
            .insert(Comment::new(older.id, author.id, "first".into()))
            .await
            .unwrap();

        let page = repos
            .posts
            .list_entries(PostFilter::published(now), PageRequest::new(1, 10))
            .await
            .unwrap();

        let ids: Vec<Uuid> = page.items.iter().map(|e| e.post.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert_eq!(page.items[0].comment_count, 0);
        assert_eq!(page.items[1].comment_count, 1);
        assert_eq!(page.items[1].author.username, "anna");
    }

    #[tokio::test]
    async fn test_update_missing_entity_is_not_found() {
        let store = InMemoryStore::new();
        let user = User::new("ghost".into(), String::new(), "hash".into());

        let result = store.repository::<User>().update(user).await;
        assert!(matches!(result, Err(RepoError::NotFound)));
    }
}
