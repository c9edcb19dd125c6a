//! Listing and detail queries.
//!
//! Each listing context has its own named function stating its filter; all
//! of them sort by `pub_date` descending and annotate comment counts (the
//! repository contract).

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Category, CommentEntry, PostEntry, Profile};
use crate::error::DomainError;
use crate::pagination::{Page, PageRequest};
use crate::ports::{PostFilter, Repositories};

#[derive(Debug, Clone, Serialize)]
pub struct CategoryPage {
    pub category: Category,
    pub posts: Page<PostEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfilePage {
    pub profile: Profile,
    /// The viewer is looking at their own profile.
    pub is_owner: bool,
    pub posts: Page<PostEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub entry: PostEntry,
    pub comments: Vec<CommentEntry>,
}

/// Read side of the blog.
#[derive(Clone)]
pub struct PostQueries {
    repos: Repositories,
    per_page: u64,
}

impl PostQueries {
    pub fn new(repos: Repositories, per_page: u64) -> Self {
        Self { repos, per_page }
    }

    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Index page: every publicly visible post.
    pub async fn global_listing(
        &self,
        now: DateTime<Utc>,
        page: u64,
    ) -> Result<Page<PostEntry>, DomainError> {
        self.fetch_page(PostFilter::published(now), page).await
    }

    /// Publicly visible posts of one published category.
    pub async fn category_listing(
        &self,
        slug: &str,
        now: DateTime<Utc>,
        page: u64,
    ) -> Result<CategoryPage, DomainError> {
        let category = self
            .repos
            .categories
            .find_by_slug(slug)
            .await?
            .filter(|c| c.is_published)
            .ok_or_else(|| DomainError::not_found("category", slug))?;

        let posts = self
            .fetch_page(PostFilter::published(now).in_category(category.id), page)
            .await?;

        Ok(CategoryPage { category, posts })
    }

    /// One author's posts. The owner sees drafts and scheduled posts too.
    pub async fn profile_listing(
        &self,
        username: &str,
        viewer: Option<Uuid>,
        now: DateTime<Utc>,
        page: u64,
    ) -> Result<ProfilePage, DomainError> {
        let user = self
            .repos
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))?;

        let is_owner = viewer == Some(user.id);
        let filter = if is_owner {
            PostFilter::all().by_author(user.id)
        } else {
            PostFilter::published(now).by_author(user.id)
        };
        let posts = self.fetch_page(filter, page).await?;

        Ok(ProfilePage {
            profile: user.profile(),
            is_owner,
            posts,
        })
    }

    /// A single post with its comments.
    ///
    /// Non-authors asking for a hidden post get not-found, never the draft.
    pub async fn post_detail(
        &self,
        id: Uuid,
        viewer: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<PostDetail, DomainError> {
        let entry = self
            .repos
            .posts
            .find_entry(id, PostFilter::all())
            .await?
            .ok_or_else(|| DomainError::not_found("post", id))?;

        let entry = if viewer == Some(entry.post.author_id) {
            entry
        } else {
            self.repos
                .posts
                .find_entry(id, PostFilter::published(now))
                .await?
                .ok_or_else(|| DomainError::not_found("post", id))?
        };

        let comments = self.repos.comments.list_for_post(id).await?;
        Ok(PostDetail { entry, comments })
    }

    async fn fetch_page(
        &self,
        filter: PostFilter,
        page: u64,
    ) -> Result<Page<PostEntry>, DomainError> {
        let request = PageRequest::new(page, self.per_page);
        if page == 0 || !request.is_addressable() {
            return Err(DomainError::not_found("page", page));
        }
        let posts = self.repos.posts.list_entries(filter, request).await?;
        if posts.is_out_of_range() {
            return Err(DomainError::not_found("page", page));
        }
        Ok(posts)
    }
}
