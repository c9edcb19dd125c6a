use uuid::Uuid;

use crate::domain::{Comment, Post, User};

/// Anything owned by exactly one user.
pub trait Authored {
    fn author_id(&self) -> Uuid;
}

impl Authored for Post {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

impl Authored for Comment {
    fn author_id(&self) -> Uuid {
        self.author_id
    }
}

/// A user record is owned by that user.
impl Authored for User {
    fn author_id(&self) -> Uuid {
        self.id
    }
}

/// Only the author may edit or delete.
pub fn can_modify<T: Authored + ?Sized>(actor_id: Uuid, target: &T) -> bool {
    actor_id == target.author_id()
}

/// Outcome of a modification check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// Anonymous actor; send them to log in first.
    LoginRequired,
    NotAuthor,
}

/// Anonymous actors are turned away before the author comparison.
pub fn authorize_modification<T: Authored + ?Sized>(actor: Option<Uuid>, target: &T) -> Decision {
    match actor {
        None => Decision::LoginRequired,
        Some(actor_id) if can_modify(actor_id, target) => Decision::Allow,
        Some(_) => Decision::NotAuthor,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_only_author_can_modify_post() {
        let author = Uuid::new_v4();
        let post = Post::new(author, "T".into(), "X".into(), Utc::now());

        assert!(can_modify(author, &post));
        assert!(!can_modify(Uuid::new_v4(), &post));
    }

    #[test]
    fn test_only_author_can_modify_comment() {
        let author = Uuid::new_v4();
        let comment = Comment::new(Uuid::new_v4(), author, "Nice".into());

        assert_eq!(
            authorize_modification(Some(author), &comment),
            Decision::Allow
        );
        assert_eq!(
            authorize_modification(Some(Uuid::new_v4()), &comment),
            Decision::NotAuthor
        );
    }

    #[test]
    fn test_anonymous_is_always_sent_to_login() {
        let comment = Comment::new(Uuid::new_v4(), Uuid::new_v4(), "Nice".into());
        assert_eq!(
            authorize_modification(None, &comment),
            Decision::LoginRequired
        );
    }
}
