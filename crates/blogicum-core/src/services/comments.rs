//! Comment lifecycle: created by any logged-in reader of a post, then edited
//! or deleted only by its author.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::validation::required;
use super::{ensure_can_modify, require_login};
use crate::domain::Comment;
use crate::error::{DomainError, FieldErrors};
use crate::policy::can_view;
use crate::ports::Repositories;

#[derive(Clone)]
pub struct CommentService {
    repos: Repositories,
}

impl CommentService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// The post must exist and be visible to the commenter.
    pub async fn create(
        &self,
        actor: Option<Uuid>,
        post_id: Uuid,
        text: String,
        now: DateTime<Utc>,
    ) -> Result<Comment, DomainError> {
        let author_id = require_login(actor)?;

        let post = self
            .repos
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;
        let category = match post.category_id {
            Some(id) => self.repos.categories.find_by_id(id).await?,
            None => None,
        };
        if !can_view(actor, &post, category.as_ref(), now) {
            return Err(DomainError::not_found("post", post_id));
        }

        validate_text(&text)?;

        let comment = self
            .repos
            .comments
            .insert(Comment::new(post.id, author_id, text))
            .await?;
        tracing::info!(comment_id = %comment.id, %post_id, "Comment created");
        Ok(comment)
    }

    /// The comment as its author may edit it.
    pub async fn edit_form(
        &self,
        actor: Option<Uuid>,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Comment, DomainError> {
        require_login(actor)?;
        let comment = self.load(post_id, comment_id).await?;
        ensure_can_modify(actor, &comment, post_id)?;
        Ok(comment)
    }

    pub async fn update(
        &self,
        actor: Option<Uuid>,
        post_id: Uuid,
        comment_id: Uuid,
        text: String,
    ) -> Result<Comment, DomainError> {
        let mut comment = self.edit_form(actor, post_id, comment_id).await?;
        validate_text(&text)?;

        comment.text = text;
        let comment = self.repos.comments.update(comment).await?;
        tracing::info!(%comment_id, %post_id, "Comment updated");
        Ok(comment)
    }

    pub async fn delete(
        &self,
        actor: Option<Uuid>,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Comment, DomainError> {
        let comment = self.edit_form(actor, post_id, comment_id).await?;
        self.repos.comments.delete(comment.id).await?;
        tracing::info!(%comment_id, %post_id, "Comment deleted");
        Ok(comment)
    }

    /// A comment addressed through a different post is treated as missing.
    async fn load(&self, post_id: Uuid, comment_id: Uuid) -> Result<Comment, DomainError> {
        self.repos
            .comments
            .find_by_id(comment_id)
            .await?
            .filter(|c| c.post_id == post_id)
            .ok_or_else(|| DomainError::not_found("comment", comment_id))
    }
}

fn validate_text(text: &str) -> Result<(), DomainError> {
    let mut errors = FieldErrors::new();
    required(&mut errors, "text", text);
    errors.into_result()
}
