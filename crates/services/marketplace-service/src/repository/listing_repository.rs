//! Service listing repository, including the gallery query.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use uuid::Uuid;

use super::entities::service::{self, ActiveModel, Entity as ServiceEntity};
use super::write_error;
use common::{AppError, AppResult, PaginationParams};
use domain::{ListingChanges, ListingQuery, ListingSort, NewListing, ServiceListing};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ServiceListing>>;

    /// Lookup by the (provider, title) natural key
    async fn find_by_provider_and_title(
        &self,
        provider_id: Uuid,
        title: &str,
    ) -> AppResult<Option<ServiceListing>>;

    async fn create(&self, listing: NewListing) -> AppResult<ServiceListing>;

    async fn update(&self, id: Uuid, changes: ListingChanges) -> AppResult<ServiceListing>;

    /// Delete listing; its hires go with it
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Filtered, sorted page of listings plus the total match count
    async fn search(
        &self,
        query: &ListingQuery,
        page: PaginationParams,
    ) -> AppResult<(Vec<ServiceListing>, u64)>;
}

pub struct ListingStore {
    db: DatabaseConnection,
}

impl ListingStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Escape LIKE wildcards so user input matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn filtered(query: &ListingQuery) -> Select<ServiceEntity> {
    let mut select = ServiceEntity::find();

    if let Some(category_id) = query.category_id {
        select = select.filter(service::Column::CategoryId.eq(category_id));
    }
    if let Some(provider_id) = query.provider_id {
        select = select.filter(service::Column::ProviderId.eq(provider_id));
    }
    if let Some(min) = query.min_price_cents {
        select = select.filter(service::Column::PriceCents.gte(min));
    }
    if let Some(max) = query.max_price_cents {
        select = select.filter(service::Column::PriceCents.lte(max));
    }
    if let Some(term) = &query.search {
        let pattern = like_pattern(term);
        select = select.filter(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col(service::Column::Title)))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col(service::Column::Description)))
                        .like(LikeExpr::new(pattern).escape('\\')),
                ),
        );
    }

    select
}

fn sorted(select: Select<ServiceEntity>, sort: ListingSort) -> Select<ServiceEntity> {
    let select = match sort {
        ListingSort::Newest => select.order_by_desc(service::Column::CreatedAt),
        ListingSort::Oldest => select.order_by_asc(service::Column::CreatedAt),
        ListingSort::PriceAsc => select.order_by_asc(service::Column::PriceCents),
        ListingSort::PriceDesc => select.order_by_desc(service::Column::PriceCents),
        ListingSort::Title => select.order_by_asc(service::Column::Title),
    };
    // Stable pages when the sort key ties
    select.order_by_asc(service::Column::Id)
}

#[async_trait]
impl ListingRepository for ListingStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<ServiceListing>> {
        let result = ServiceEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(ServiceListing::from))
    }

    async fn find_by_provider_and_title(
        &self,
        provider_id: Uuid,
        title: &str,
    ) -> AppResult<Option<ServiceListing>> {
        let result = ServiceEntity::find()
            .filter(service::Column::ProviderId.eq(provider_id))
            .filter(service::Column::Title.eq(title))
            .one(&self.db)
            .await?;
        Ok(result.map(ServiceListing::from))
    }

    async fn create(&self, new: NewListing) -> AppResult<ServiceListing> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            provider_id: Set(new.provider_id),
            category_id: Set(new.category_id),
            title: Set(new.title),
            description: Set(new.description),
            price_cents: Set(new.price_cents),
            image_url: Set(new.image_url),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| write_error(e, "Service"))?;
        Ok(ServiceListing::from(model))
    }

    async fn update(&self, id: Uuid, changes: ListingChanges) -> AppResult<ServiceListing> {
        let existing = ServiceEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        if let Some(category_id) = changes.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(Some(description));
        }
        if let Some(price_cents) = changes.price_cents {
            active.price_cents = Set(price_cents);
        }
        if let Some(image_url) = changes.image_url {
            active.image_url = Set(Some(image_url));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active
            .update(&self.db)
            .await
            .map_err(|e| write_error(e, "Service"))?;
        Ok(ServiceListing::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = ServiceEntity::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn search(
        &self,
        query: &ListingQuery,
        page: PaginationParams,
    ) -> AppResult<(Vec<ServiceListing>, u64)> {
        let select = filtered(query);
        let total = select.clone().count(&self.db).await?;

        let models = sorted(select, query.sort)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((models.into_iter().map(ServiceListing::from).collect(), total))
    }
}
