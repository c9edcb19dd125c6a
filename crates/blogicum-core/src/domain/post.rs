use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, Location, Profile};

/// Post entity - a blog entry with scheduled visibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    /// The post is not publicly visible before this instant.
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new published post, visible from `pub_date`.
    pub fn new(author_id: Uuid, title: String, text: String, pub_date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author_id,
            title,
            text,
            image: None,
            pub_date,
            is_published: true,
            category_id: None,
            location_id: None,
            created_at: Utc::now(),
        }
    }
}

/// A post joined with everything a listing or detail page shows next to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEntry {
    pub post: Post,
    pub author: Profile,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub comment_count: u64,
}
