use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Post};

/// Whether a non-author may currently see `post`.
///
/// `category` is the post's resolved category, `None` when it has none.
pub fn is_publicly_visible(post: &Post, category: Option<&Category>, now: DateTime<Utc>) -> bool {
    post.is_published && post.pub_date <= now && category.is_none_or(|c| c.is_published)
}

/// Authors always see their own posts; everybody else needs public visibility.
pub fn can_view(
    viewer: Option<Uuid>,
    post: &Post,
    category: Option<&Category>,
    now: DateTime<Utc>,
) -> bool {
    viewer == Some(post.author_id) || is_publicly_visible(post, category, now)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn post_at(pub_date: DateTime<Utc>) -> Post {
        Post::new(Uuid::new_v4(), "Title".into(), "Text".into(), pub_date)
    }

    #[test]
    fn test_published_past_post_is_visible() {
        let now = Utc::now();
        let post = post_at(now - Duration::hours(1));
        assert!(is_publicly_visible(&post, None, now));
    }

    #[test]
    fn test_pub_date_equal_to_now_is_visible() {
        let now = Utc::now();
        assert!(is_publicly_visible(&post_at(now), None, now));
    }

    #[test]
    fn test_future_post_is_hidden_regardless_of_flag() {
        let now = Utc::now();
        let mut post = post_at(now + Duration::hours(1));
        assert!(!is_publicly_visible(&post, None, now));
        post.is_published = false;
        assert!(!is_publicly_visible(&post, None, now));
    }

    #[test]
    fn test_unpublished_post_is_hidden() {
        let now = Utc::now();
        let mut post = post_at(now - Duration::days(1));
        post.is_published = false;
        assert!(!is_publicly_visible(&post, None, now));
    }

    #[test]
    fn test_unpublished_category_hides_published_post() {
        let now = Utc::now();
        let mut category = Category::new("Travel".into(), String::new(), "travel".into());
        let mut post = post_at(now - Duration::days(1));
        post.category_id = Some(category.id);

        assert!(is_publicly_visible(&post, Some(&category), now));
        category.is_published = false;
        assert!(!is_publicly_visible(&post, Some(&category), now));
    }

    #[test]
    fn test_author_sees_hidden_post() {
        let now = Utc::now();
        let mut post = post_at(now + Duration::hours(1));
        post.is_published = false;

        assert!(can_view(Some(post.author_id), &post, None, now));
        assert!(!can_view(Some(Uuid::new_v4()), &post, None, now));
        assert!(!can_view(None, &post, None, now));
    }
}
