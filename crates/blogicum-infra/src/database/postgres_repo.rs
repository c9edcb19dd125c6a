//! PostgreSQL repository implementations.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select,
};
use uuid::Uuid;

use blogicum_core::domain::{Category, CommentEntry, Location, PostEntry, User};
use blogicum_core::error::RepoError;
use blogicum_core::pagination::{Page, PageRequest};
use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostFilter, PostRepository,
    UserRepository,
};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::location::{self, Entity as LocationEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL location repository.
pub type PostgresLocationRepository = PostgresBaseRepository<LocationEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let result = CategoryEntity::find()
            .order_by_asc(category::Column::Title)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl LocationRepository for PostgresLocationRepository {
    async fn list(&self) -> Result<Vec<Location>, RepoError> {
        let result = LocationEntity::find()
            .order_by_asc(location::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// SQL form of [`PostFilter`]. The visibility branch mirrors
/// `policy::is_publicly_visible` and needs the category join.
fn post_condition(filter: PostFilter) -> Condition {
    let mut condition = Condition::all();

    if let Some(author_id) = filter.author_id {
        condition = condition.add(post::Column::AuthorId.eq(author_id));
    }
    if let Some(category_id) = filter.category_id {
        condition = condition.add(post::Column::CategoryId.eq(category_id));
    }
    if let Some(now) = filter.visible_at {
        condition = condition
            .add(post::Column::IsPublished.eq(true))
            .add(post::Column::PubDate.lte(DateTimeWithTimeZone::from(now)))
            .add(
                Condition::any()
                    .add(post::Column::CategoryId.is_null())
                    .add(category::Column::IsPublished.eq(true)),
            );
    }

    condition
}

fn filtered_posts(filter: PostFilter) -> Select<PostEntity> {
    PostEntity::find()
        .join(JoinType::LeftJoin, post::Relation::Category.def())
        .filter(post_condition(filter))
}

impl PostgresPostRepository {
    /// Attach authors, categories, locations and comment counts.
    /// Four batched queries, whatever the page size.
    async fn assemble(&self, posts: Vec<post::Model>) -> Result<Vec<PostEntry>, RepoError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let author_ids: HashSet<Uuid> = posts.iter().map(|p| p.author_id).collect();
        let category_ids: HashSet<Uuid> = posts.iter().filter_map(|p| p.category_id).collect();
        let location_ids: HashSet<Uuid> = posts.iter().filter_map(|p| p.location_id).collect();

        let authors: HashMap<Uuid, User> = UserEntity::find()
            .filter(user::Column::Id.is_in(author_ids))
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .map(|m| (m.id, m.into()))
            .collect();

        let categories: HashMap<Uuid, Category> = if category_ids.is_empty() {
            HashMap::new()
        } else {
            CategoryEntity::find()
                .filter(category::Column::Id.is_in(category_ids))
                .all(&self.db)
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|m| (m.id, m.into()))
                .collect()
        };

        let locations: HashMap<Uuid, Location> = if location_ids.is_empty() {
            HashMap::new()
        } else {
            LocationEntity::find()
                .filter(location::Column::Id.is_in(location_ids))
                .all(&self.db)
                .await
                .map_err(map_db_err)?
                .into_iter()
                .map(|m| (m.id, m.into()))
                .collect()
        };

        let counts: HashMap<Uuid, i64> = CommentEntity::find()
            .select_only()
            .column(comment::Column::PostId)
            .column_as(Expr::col(comment::Column::Id).count(), "comment_count")
            .filter(comment::Column::PostId.is_in(post_ids))
            .group_by(comment::Column::PostId)
            .into_tuple::<(Uuid, i64)>()
            .all(&self.db)
            .await
            .map_err(map_db_err)?
            .into_iter()
            .collect();

        posts
            .into_iter()
            .map(|model| {
                let author = authors
                    .get(&model.author_id)
                    .ok_or_else(|| RepoError::Query(format!("post {} has no author", model.id)))?
                    .profile();
                let category = model.category_id.and_then(|id| categories.get(&id).cloned());
                let location = model.location_id.and_then(|id| locations.get(&id).cloned());
                let comment_count = counts.get(&model.id).copied().unwrap_or(0).max(0) as u64;

                Ok(PostEntry {
                    post: model.into(),
                    author,
                    category,
                    location,
                    comment_count,
                })
            })
            .collect()
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_entry(
        &self,
        id: Uuid,
        filter: PostFilter,
    ) -> Result<Option<PostEntry>, RepoError> {
        let model = filtered_posts(filter)
            .filter(post::Column::Id.eq(id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        match model {
            Some(model) => Ok(self.assemble(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list_entries(
        &self,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostEntry>, RepoError> {
        tracing::debug!(?filter, page = page.number, "Listing posts");

        let paginator = filtered_posts(filter)
            .order_by_desc(post::Column::PubDate)
            .order_by_desc(post::Column::CreatedAt)
            .paginate(&self.db, page.per_page);

        let total = paginator.num_items().await.map_err(map_db_err)?;
        let models = paginator
            .fetch_page(page.number - 1)
            .await
            .map_err(map_db_err)?;

        let entries = self.assemble(models).await?;
        Ok(Page::new(entries, page, total))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentEntry>, RepoError> {
        let rows = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::CreatedAt)
            .find_also_related(UserEntity)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        rows.into_iter()
            .map(|(comment, author)| {
                let author: User = author
                    .ok_or_else(|| {
                        RepoError::Query(format!("comment {} has no author", comment.id))
                    })?
                    .into();
                Ok(CommentEntry {
                    comment: comment.into(),
                    author: author.profile(),
                })
            })
            .collect()
    }
}
