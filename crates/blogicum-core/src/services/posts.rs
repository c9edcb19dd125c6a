//! Creating, editing and deleting posts.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::validation::{max_chars, required};
use super::{ensure_can_modify, require_login};
use crate::domain::Post;
use crate::error::{DomainError, FieldErrors};
use crate::ports::Repositories;

const TITLE_MAX_CHARS: usize = 256;

/// Author-supplied post fields.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    /// `None` means "now" on create and "unchanged" on edit.
    pub pub_date: Option<DateTime<Utc>>,
    pub is_published: bool,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct PostService {
    repos: Repositories,
}

impl PostService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn create(
        &self,
        actor: Option<Uuid>,
        draft: PostDraft,
        now: DateTime<Utc>,
    ) -> Result<Post, DomainError> {
        let author_id = require_login(actor)?;
        self.validate(&draft).await?;

        let mut post = Post::new(
            author_id,
            draft.title,
            draft.text,
            draft.pub_date.unwrap_or(now),
        );
        post.image = draft.image.filter(|i| !i.trim().is_empty());
        post.is_published = draft.is_published;
        post.category_id = draft.category_id;
        post.location_id = draft.location_id;

        let post = self.repos.posts.insert(post).await?;
        tracing::info!(post_id = %post.id, author_id = %author_id, "Post created");
        Ok(post)
    }

    /// The post as its author may edit it.
    pub async fn edit_form(&self, actor: Option<Uuid>, post_id: Uuid) -> Result<Post, DomainError> {
        require_login(actor)?;
        let post = self.load(post_id).await?;
        ensure_can_modify(actor, &post, post.id)?;
        Ok(post)
    }

    pub async fn update(
        &self,
        actor: Option<Uuid>,
        post_id: Uuid,
        draft: PostDraft,
    ) -> Result<Post, DomainError> {
        let mut post = self.edit_form(actor, post_id).await?;
        self.validate(&draft).await?;

        post.title = draft.title;
        post.text = draft.text;
        post.image = draft.image.filter(|i| !i.trim().is_empty());
        if let Some(pub_date) = draft.pub_date {
            post.pub_date = pub_date;
        }
        post.is_published = draft.is_published;
        post.category_id = draft.category_id;
        post.location_id = draft.location_id;

        let post = self.repos.posts.update(post).await?;
        tracing::info!(post_id = %post.id, "Post updated");
        Ok(post)
    }

    /// Deletes the post and, with it, its comments.
    pub async fn delete(&self, actor: Option<Uuid>, post_id: Uuid) -> Result<Post, DomainError> {
        let post = self.edit_form(actor, post_id).await?;
        self.repos.posts.delete(post.id).await?;
        tracing::info!(post_id = %post.id, "Post deleted");
        Ok(post)
    }

    async fn load(&self, post_id: Uuid) -> Result<Post, DomainError> {
        self.repos
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))
    }

    async fn validate(&self, draft: &PostDraft) -> Result<(), DomainError> {
        let mut errors = FieldErrors::new();
        required(&mut errors, "title", &draft.title);
        max_chars(&mut errors, "title", &draft.title, TITLE_MAX_CHARS);
        required(&mut errors, "text", &draft.text);

        if let Some(category_id) = draft.category_id {
            if self.repos.categories.find_by_id(category_id).await?.is_none() {
                errors.add("category", "Select a valid choice.");
            }
        }
        if let Some(location_id) = draft.location_id {
            if self.repos.locations.find_by_id(location_id).await?.is_none() {
                errors.add("location", "Select a valid choice.");
            }
        }

        errors.into_result()
    }
}
