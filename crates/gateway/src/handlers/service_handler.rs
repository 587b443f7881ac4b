//! Service listing handlers, including the public gallery.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use common::pagination::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};
use common::{AppError, AppResult, ListingPage, Paginated, PaginationParams};
use domain::{ListingChanges, ListingQuery, ListingSort, ServiceListing};
use marketplace_service_lib::{CategoryRef, CreateListing};

use crate::extractors::ValidatedJson;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// Gallery filters, sort and page
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GalleryQuery {
    /// Only listings in this category
    pub category_id: Option<Uuid>,
    /// Only listings from this provider
    pub provider_id: Option<Uuid>,
    /// Case-insensitive text in title or description
    pub q: Option<String>,
    /// Minimum price in cents, inclusive
    pub min_price: Option<i64>,
    /// Maximum price in cents, inclusive
    pub max_price: Option<i64>,
    /// newest (default), oldest, price_asc, price_desc or title
    #[param(value_type = Option<String>)]
    pub sort: Option<ListingSort>,
    /// 1-indexed page number
    pub page: Option<u64>,
    /// Items per page, at most 100
    pub per_page: Option<u64>,
}

impl GalleryQuery {
    fn into_parts(self) -> (ListingQuery, PaginationParams) {
        let query = ListingQuery {
            category_id: self.category_id,
            provider_id: self.provider_id,
            search: self.q,
            min_price_cents: self.min_price,
            max_price_cents: self.max_price,
            sort: self.sort.unwrap_or_default(),
        };
        let page = PaginationParams::new(
            self.page.unwrap_or(DEFAULT_PAGE_NUMBER),
            self.per_page.unwrap_or(DEFAULT_PAGE_SIZE),
        );
        (query, page)
    }
}

/// Listing creation request. Name the category by `category_id` or by
/// `category`; an unknown name creates the category.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateServiceRequest {
    pub category_id: Option<Uuid>,
    #[schema(example = "Plumbing")]
    pub category: Option<String>,
    #[validate(length(min = 1, max = 120, message = "Title is required"))]
    #[schema(example = "Leak repair")]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    #[schema(example = 4500)]
    pub price_cents: i64,
    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
}

impl CreateServiceRequest {
    fn category_ref(&self) -> AppResult<CategoryRef> {
        match (self.category_id, self.category.as_deref()) {
            (Some(id), None) => Ok(CategoryRef::Id(id)),
            (None, Some(name)) => Ok(CategoryRef::Name(name.to_string())),
            (Some(_), Some(_)) => Err(AppError::validation(
                "Give either category_id or category, not both",
            )),
            (None, None) => Err(AppError::validation("A category is required")),
        }
    }
}

/// Partial listing update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateServiceRequest {
    pub category_id: Option<Uuid>,
    #[validate(length(min = 1, max = 120, message = "Title cannot be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price_cents: Option<i64>,
    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
}

/// Public listing routes
pub fn service_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_services))
        .route("/:id", get(get_service))
}

/// Listing routes that need a logged-in provider
pub fn service_protected_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_service))
        .route("/:id", put(update_service).delete(delete_service))
}

/// Gallery of services
#[utoipa::path(
    get,
    path = "/services",
    tag = "Services",
    params(GalleryQuery),
    responses(
        (status = 200, description = "One page of matching services", body = ListingPage),
        (status = 400, description = "Invalid filter")
    )
)]
pub async fn list_services(
    State(state): State<AppState>,
    Query(params): Query<GalleryQuery>,
) -> AppResult<Json<Paginated<ServiceListing>>> {
    let (query, page) = params.into_parts();
    Ok(Json(state.services.listings.search(query, page).await?))
}

/// Get a service
#[utoipa::path(
    get,
    path = "/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service", body = ServiceListing),
        (status = 404, description = "Service not found")
    )
)]
pub async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ServiceListing>> {
    Ok(Json(state.services.listings.get_listing(id).await?))
}

/// List a new service under the caller's provider profile
#[utoipa::path(
    post,
    path = "/services",
    tag = "Services",
    security(("bearer_auth" = [])),
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service created", body = ServiceListing),
        (status = 400, description = "Validation error or no provider profile"),
        (status = 409, description = "Caller already lists a service with this title")
    )
)]
pub async fn create_service(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateServiceRequest>,
) -> AppResult<(StatusCode, Json<ServiceListing>)> {
    let input = CreateListing {
        category: payload.category_ref()?,
        title: payload.title,
        description: payload.description,
        price_cents: payload.price_cents,
        image_url: payload.image_url,
    };
    let listing = state
        .services
        .listings
        .create_listing(current_user.actor(), input)
        .await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

/// Update a service (owner or admin)
#[utoipa::path(
    put,
    path = "/services/{id}",
    tag = "Services",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Service ID")),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Service updated", body = ServiceListing),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Service not found"),
        (status = 409, description = "Title already used by another of the owner's services")
    )
)]
pub async fn update_service(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateServiceRequest>,
) -> AppResult<Json<ServiceListing>> {
    let changes = ListingChanges {
        category_id: payload.category_id,
        title: payload.title,
        description: payload.description,
        price_cents: payload.price_cents,
        image_url: payload.image_url,
    };
    let listing = state
        .services
        .listings
        .update_listing(current_user.actor(), id, changes)
        .await?;
    Ok(Json(listing))
}

/// Delete a service with its hires and payments (owner or admin)
#[utoipa::path(
    delete,
    path = "/services/{id}",
    tag = "Services",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Service ID")),
    responses(
        (status = 204, description = "Service deleted"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Service not found")
    )
)]
pub async fn delete_service(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state
        .services
        .listings
        .delete_listing(current_user.actor(), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gallery_defaults() {
        let (query, page) = GalleryQuery::default().into_parts();
        assert_eq!(query, ListingQuery::default());
        assert_eq!(page, PaginationParams::default());
    }

    #[test]
    fn test_gallery_query_string() {
        let uri: axum::http::Uri = "/services?q=leak&min_price=100&sort=price_desc&page=2&per_page=5"
            .parse()
            .unwrap();
        let Query(params) = Query::<GalleryQuery>::try_from_uri(&uri).unwrap();
        let (query, page) = params.into_parts();
        assert_eq!(query.search.as_deref(), Some("leak"));
        assert_eq!(query.min_price_cents, Some(100));
        assert_eq!(query.sort, ListingSort::PriceDesc);
        assert_eq!(page.offset(), 5);
    }

    #[test]
    fn test_gallery_huge_page_does_not_overflow() {
        let uri: axum::http::Uri = "/services?page=18446744073709551615&per_page=100"
            .parse()
            .unwrap();
        let Query(params) = Query::<GalleryQuery>::try_from_uri(&uri).unwrap();
        let (_, page) = params.into_parts();
        assert_eq!(page.offset(), common::pagination::MAX_OFFSET);
    }

    #[test]
    fn test_category_ref_requires_exactly_one() {
        let mut request = CreateServiceRequest {
            category_id: None,
            category: Some("Plumbing".to_string()),
            title: "Leak repair".to_string(),
            description: None,
            price_cents: 100,
            image_url: None,
        };
        assert_eq!(
            request.category_ref().unwrap(),
            CategoryRef::Name("Plumbing".to_string())
        );

        request.category_id = Some(Uuid::new_v4());
        assert!(request.category_ref().is_err());

        request.category_id = None;
        request.category = None;
        assert!(request.category_ref().is_err());
    }
}
