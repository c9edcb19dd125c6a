//! Services - the operations the HTTP layer orchestrates.
//!
//! Every mutating operation calls the authorization policy explicitly before
//! touching the store; every read of a post goes through the visibility
//! policy.

mod accounts;
mod comments;
mod posts;
mod queries;
mod validation;

pub use accounts::{AccountService, ProfileChanges, Registration};
pub use comments::CommentService;
pub use posts::{PostDraft, PostService};
pub use queries::{CategoryPage, PostDetail, PostQueries, ProfilePage};

use uuid::Uuid;

use crate::error::DomainError;
use crate::policy::{Authored, Decision, authorize_modification};

/// Run the modification policy and turn a denial into the matching error.
/// `post_id` is where a rejected author gets sent back to.
pub(crate) fn ensure_can_modify<T: Authored + ?Sized>(
    actor: Option<Uuid>,
    target: &T,
    post_id: Uuid,
) -> Result<Uuid, DomainError> {
    match authorize_modification(actor, target) {
        Decision::Allow => Ok(target.author_id()),
        Decision::LoginRequired => Err(DomainError::LoginRequired),
        Decision::NotAuthor => {
            tracing::warn!(
                actor = ?actor,
                owner = %target.author_id(),
                %post_id,
                "Modification denied: actor is not the author"
            );
            Err(DomainError::NotAuthor { post_id })
        }
    }
}

/// Anonymous actors never get past the login redirect.
pub(crate) fn require_login(actor: Option<Uuid>) -> Result<Uuid, DomainError> {
    actor.ok_or(DomainError::LoginRequired)
}
