use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use uuid::Uuid;

use blogicum_core::domain::{Post, User};
use blogicum_core::pagination::PageRequest;
use blogicum_core::ports::{BaseRepository, PostFilter, PostRepository, UserRepository};

use crate::database::entity::{post, user};
use crate::database::postgres_repo::{PostgresPostRepository, PostgresUserRepository};

fn post_model(id: Uuid, author_id: Uuid) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        author_id,
        title: "Test Post".to_owned(),
        text: "Content".to_owned(),
        image: None,
        pub_date: now.into(),
        is_published: true,
        category_id: None,
        location_id: None,
        created_at: now.into(),
    }
}

fn user_model(id: Uuid, username: &str) -> user::Model {
    let now = Utc::now();
    user::Model {
        id,
        username: username.to_owned(),
        first_name: "Anna".to_owned(),
        last_name: String::new(),
        email: "anna@example.com".to_owned(),
        password_hash: "hash".to_owned(),
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, author_id)]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.author_id, author_id);
}

#[tokio::test]
async fn test_find_user_by_username() {
    let user_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user_model(user_id, "anna")]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);

    let user: User = repo.find_by_username("anna").await.unwrap().unwrap();
    assert_eq!(user.id, user_id);
    assert_eq!(user.display_name(), "Anna");
}

#[tokio::test]
async fn test_find_entry_attaches_author() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_model(post_id, author_id)]])
        .append_query_results([vec![user_model(author_id, "anna")]])
        .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let entry = repo
        .find_entry(post_id, PostFilter::published(Utc::now()))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(entry.post.id, post_id);
    assert_eq!(entry.author.username, "anna");
    assert_eq!(entry.comment_count, 0);
    assert!(entry.category.is_none());
}

#[tokio::test]
async fn test_published_listing_filters_in_sql() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[BTreeMap::from([("num_items", Value::BigInt(Some(0)))])]])
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let page = repo
        .list_entries(PostFilter::published(Utc::now()), PageRequest::new(1, 10))
        .await
        .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total_items, 0);

    let log = format!("{:?}", repo.db.into_transaction_log());
    assert!(log.contains("LEFT JOIN"));
    assert!(log.contains("is_published"));
    assert!(log.contains("pub_date"));
    assert!(log.contains("ORDER BY"));
}
