//! Domain values rendered as wire types.

use blogicum_core::Page;
use blogicum_core::domain::{
    Category, Comment, CommentEntry, Location, Post, PostEntry, Profile, User,
};
use blogicum_core::services::{CategoryPage, PostDetail, PostDraft, ProfileChanges, ProfilePage};
use blogicum_shared::dto::{
    CategoryPageView, CategoryView, CommentForm, CommentView, LocationView, PageView,
    PostDetailView, PostForm, PostView, ProfileForm, ProfilePageView, ProfileView, UserResponse,
};

pub fn profile(profile: Profile) -> ProfileView {
    ProfileView {
        id: profile.id,
        username: profile.username,
        display_name: profile.display_name,
        joined_at: profile.joined_at,
    }
}

pub fn user(user: User) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
        created_at: user.created_at,
    }
}

pub fn category(category: Category) -> CategoryView {
    CategoryView {
        id: category.id,
        title: category.title,
        description: category.description,
        slug: category.slug,
    }
}

pub fn location(location: Location) -> LocationView {
    LocationView {
        id: location.id,
        name: location.name,
    }
}

pub fn post(entry: PostEntry) -> PostView {
    let PostEntry {
        post,
        author,
        category: post_category,
        location: post_location,
        comment_count,
    } = entry;

    PostView {
        id: post.id,
        title: post.title,
        text: post.text,
        image: post.image,
        pub_date: post.pub_date,
        is_published: post.is_published,
        created_at: post.created_at,
        author: profile(author),
        category: post_category.map(category),
        location: post_location.map(location),
        comment_count,
    }
}

pub fn comment(entry: CommentEntry) -> CommentView {
    CommentView {
        id: entry.comment.id,
        post_id: entry.comment.post_id,
        text: entry.comment.text,
        created_at: entry.comment.created_at,
        author: profile(entry.author),
    }
}

pub fn page<T, U>(page: Page<T>, f: impl FnMut(T) -> U) -> PageView<U> {
    let has_next = page.has_next();
    let has_previous = page.has_previous();
    let page = page.map(f);

    PageView {
        items: page.items,
        page: page.number,
        per_page: page.per_page,
        total_items: page.total_items,
        total_pages: page.total_pages,
        has_next,
        has_previous,
    }
}

pub fn category_page(listing: CategoryPage) -> CategoryPageView {
    CategoryPageView {
        category: category(listing.category),
        posts: page(listing.posts, post),
    }
}

pub fn profile_page(listing: ProfilePage) -> ProfilePageView {
    ProfilePageView {
        profile: profile(listing.profile),
        is_owner: listing.is_owner,
        posts: page(listing.posts, post),
    }
}

pub fn post_detail(detail: PostDetail) -> PostDetailView {
    PostDetailView {
        post: post(detail.entry),
        comments: detail.comments.into_iter().map(comment).collect(),
    }
}

/// Current values of a stored post, for its edit form.
pub fn post_form(post: Post) -> PostForm {
    PostForm {
        title: post.title,
        text: post.text,
        image: post.image,
        pub_date: Some(post.pub_date),
        is_published: post.is_published,
        category_id: post.category_id,
        location_id: post.location_id,
    }
}

pub fn comment_form(comment: Comment) -> CommentForm {
    CommentForm { text: comment.text }
}

pub fn profile_form(user: User) -> ProfileForm {
    ProfileForm {
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
    }
}

pub fn post_draft(form: PostForm) -> PostDraft {
    PostDraft {
        title: form.title,
        text: form.text,
        image: form.image.filter(|image| !image.trim().is_empty()),
        pub_date: form.pub_date,
        is_published: form.is_published,
        category_id: form.category_id,
        location_id: form.location_id,
    }
}

pub fn profile_changes(form: ProfileForm) -> ProfileChanges {
    ProfileChanges {
        username: form.username,
        first_name: form.first_name,
        last_name: form.last_name,
        email: form.email,
    }
}
