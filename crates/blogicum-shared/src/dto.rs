//! Data Transfer Objects - request/response types for the API.
//!
//! Form bodies default every missing field so an incomplete submission
//! reaches validation and comes back as a 422 with per-field messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

/// Create/edit form of a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostForm {
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    /// Omitted on create means "now"; omitted on edit keeps the current date.
    pub pub_date: Option<DateTime<Utc>>,
    pub is_published: bool,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
}

impl Default for PostForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            text: String::new(),
            image: None,
            pub_date: None,
            is_published: true,
            category_id: None,
            location_id: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub text: String,
}

/// Editable fields of the signed-in user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileForm {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Request to register a new user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Request to login.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// `?page=N` on listings, 1-based.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

impl PageQuery {
    pub fn number(&self) -> u64 {
        self.page.unwrap_or(1)
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Private view of an account, returned to its owner only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// What anyone may see about an author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationView {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub image: Option<String>,
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub author: ProfileView,
    pub category: Option<CategoryView>,
    pub location: Option<LocationView>,
    pub comment_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: ProfileView,
}

/// One page of a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageView<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPageView {
    pub category: CategoryView,
    pub posts: PageView<PostView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilePageView {
    pub profile: ProfileView,
    pub is_owner: bool,
    pub posts: PageView<PostView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailView {
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

/// Current values of a post form plus the selectable references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostFormView {
    pub form: PostForm,
    pub categories: Vec<CategoryView>,
    pub locations: Vec<LocationView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentFormView {
    pub post_id: Uuid,
    pub comment_id: Uuid,
    pub form: CommentForm,
}
