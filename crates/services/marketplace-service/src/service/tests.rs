//! Service tests against mocked repositories.

use std::sync::Arc;

use chrono::Utc;
use mockall::predicate::eq;
use uuid::Uuid;

use common::{AppError, PaginationParams};
use domain::{
    Category, CategoryChanges, Hire, HireChanges, HireStatus, ListingQuery, NewProvider, Payment,
    PaymentChanges, PaymentMethod, PaymentStatus, Provider, ServiceListing, User, UserChanges,
    UserRole,
};
use notification_service_lib::{NotificationHub, Severity};

use super::*;
use crate::repository::{
    MockCategoryRepository, MockHireRepository, MockListingRepository, MockPaymentRepository,
    MockProviderRepository, MockUserRepository,
};

// =============================================================================
// Fixtures
// =============================================================================

fn category(name: &str) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn provider(user_id: Uuid, phone: Option<&str>) -> Provider {
    Provider {
        id: Uuid::new_v4(),
        user_id,
        display_name: "Ana's Plumbing".to_string(),
        bio: None,
        phone: phone.map(str::to_string),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn listing(provider_id: Uuid, title: &str, price_cents: i64) -> ServiceListing {
    ServiceListing {
        id: Uuid::new_v4(),
        provider_id,
        category_id: Uuid::new_v4(),
        title: title.to_string(),
        description: None,
        price_cents,
        image_url: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn hire(service_id: Uuid, client_id: Uuid, status: HireStatus) -> Hire {
    Hire {
        id: Uuid::new_v4(),
        service_id,
        client_id,
        status,
        scheduled_for: None,
        notes: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn payment(hire_id: Uuid, status: PaymentStatus) -> Payment {
    Payment {
        id: Uuid::new_v4(),
        hire_id,
        amount_cents: 4500,
        currency: "USD".to_string(),
        method: PaymentMethod::Whatsapp,
        status,
        reference: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn user(id: Uuid) -> Actor {
    Actor::new(id, UserRole::User)
}

fn messages(hub: &NotificationHub, owner: Uuid) -> Vec<(String, Severity)> {
    hub.snapshot(owner)
        .into_iter()
        .map(|n| (n.message, n.severity))
        .collect()
}

/// A provider user, their profile, one listing, and a client.
struct World {
    provider_user: Uuid,
    client: Uuid,
    provider: Provider,
    listing: ServiceListing,
}

impl World {
    fn new(phone: Option<&str>) -> Self {
        let provider_user = Uuid::new_v4();
        let provider = provider(provider_user, phone);
        let listing = listing(provider.id, "Leak repair", 4500);
        Self {
            provider_user,
            client: Uuid::new_v4(),
            provider,
            listing,
        }
    }

    fn listings(&self) -> MockListingRepository {
        let listing = self.listing.clone();
        let mut repo = MockListingRepository::new();
        repo.expect_find_by_id()
            .with(eq(listing.id))
            .returning(move |_| Ok(Some(listing.clone())));
        repo
    }

    fn providers(&self) -> MockProviderRepository {
        let provider = self.provider.clone();
        let mut repo = MockProviderRepository::new();
        repo.expect_find_by_id()
            .with(eq(provider.id))
            .returning(move |_| Ok(Some(provider.clone())));
        repo
    }
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_update_user_with_no_changes_returns_current() {
    let id = Uuid::new_v4();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().with(eq(id)).returning(|id| {
        Ok(Some(User::new(
            id,
            "a@b.c".to_string(),
            "hash".to_string(),
            "Ana".to_string(),
        )))
    });
    repo.expect_update().never();

    let service = UserManager::new(Arc::new(repo), NotificationHub::default());
    let user = service.update_user(id, UserChanges::default()).await.unwrap();
    assert_eq!(user.name, "Ana");
}

#[tokio::test]
async fn test_update_user_rejects_blank_name() {
    let mut repo = MockUserRepository::new();
    repo.expect_update().never();

    let service = UserManager::new(Arc::new(repo), NotificationHub::default());
    let changes = UserChanges {
        name: Some("   ".to_string()),
        ..Default::default()
    };
    let result = service.update_user(Uuid::new_v4(), changes).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_delete_user_drops_notification_center() {
    let id = Uuid::new_v4();
    let hub = NotificationHub::default();
    let ctx = hub.context_for(id);

    let mut repo = MockUserRepository::new();
    repo.expect_delete().with(eq(id)).returning(|_| Ok(()));

    let service = UserManager::new(Arc::new(repo), hub.clone());
    service.delete_user(id).await.unwrap();

    assert!(!ctx.is_attached());
    assert_eq!(hub.owners(), 0);
}

#[tokio::test]
async fn test_delete_unknown_user_is_not_found() {
    let mut repo = MockUserRepository::new();
    repo.expect_delete().returning(|_| Err(AppError::NotFound));

    let service = UserManager::new(Arc::new(repo), NotificationHub::default());
    assert!(matches!(
        service.delete_user(Uuid::new_v4()).await,
        Err(AppError::NotFound)
    ));
}

#[tokio::test]
async fn test_register_sends_welcome_and_rejects_duplicates() {
    let mut repo = MockUserRepository::new();
    let mut seq = mockall::Sequence::new();
    repo.expect_find_by_email()
        .with(eq("new@example.com"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(None));
    repo.expect_create()
        .withf(|u| u.email == "new@example.com" && u.password_hash.starts_with("$argon2"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|u| Ok(User::new(Uuid::new_v4(), u.email, u.password_hash, u.name)));
    repo.expect_find_by_email()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|email| {
            Ok(Some(User::new(
                Uuid::new_v4(),
                email.to_string(),
                "hash".to_string(),
                "Dup".to_string(),
            )))
        });

    let hub = NotificationHub::default();
    let auth = Authenticator::new(
        Arc::new(repo),
        hub.clone(),
        common::JwtConfig {
            secret: "test-secret-that-is-at-least-32-characters".to_string(),
            expiration_hours: 1,
        },
    );

    let user = auth
        .register(
            " New@Example.com".to_string(),
            "password123".to_string(),
            "Nia".to_string(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(
        messages(&hub, user.id),
        vec![(
            "Welcome to the marketplace, Nia!".to_string(),
            Severity::Success
        )]
    );

    let duplicate = auth
        .register(
            "new@example.com".to_string(),
            "password123".to_string(),
            "Nia".to_string(),
            None,
        )
        .await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_register_rejects_short_password() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email().returning(|_| Ok(None));
    repo.expect_create().never();

    let auth = Authenticator::new(
        Arc::new(repo),
        NotificationHub::default(),
        common::JwtConfig {
            secret: "test-secret-that-is-at-least-32-characters".to_string(),
            expiration_hours: 1,
        },
    );
    let result = auth
        .register(
            "a@b.co".to_string(),
            "short".to_string(),
            "A".to_string(),
            None,
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_refresh_for_deleted_user_unauthorized() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().returning(|_| Ok(None));

    let auth = Authenticator::new(
        Arc::new(repo),
        NotificationHub::default(),
        common::JwtConfig {
            secret: "test-secret-that-is-at-least-32-characters".to_string(),
            expiration_hours: 1,
        },
    );
    let result = auth.refresh_token(Uuid::new_v4()).await;
    assert!(matches!(result, Err(AppError::Unauthorized)));
}

// =============================================================================
// Categories
// =============================================================================

#[tokio::test]
async fn test_find_or_create_returns_existing() {
    let existing = category("Plumbing");
    let expected_id = existing.id;
    let mut repo = MockCategoryRepository::new();
    repo.expect_find_by_name()
        .with(eq("Plumbing"))
        .returning(move |_| Ok(Some(existing.clone())));
    repo.expect_create().never();

    let service = CategoryManager::new(Arc::new(repo));
    let (found, created) = service.find_or_create("  Plumbing ").await.unwrap();
    assert_eq!(found.id, expected_id);
    assert!(!created);
}

#[tokio::test]
async fn test_find_or_create_creates_missing() {
    let mut repo = MockCategoryRepository::new();
    repo.expect_find_by_name().returning(|_| Ok(None));
    repo.expect_create()
        .withf(|name, description| name == "Gardening" && description.is_none())
        .returning(|name, _| Ok(category(&name)));

    let service = CategoryManager::new(Arc::new(repo));
    let (created_category, created) = service.find_or_create("Gardening").await.unwrap();
    assert_eq!(created_category.name, "Gardening");
    assert!(created);
}

#[tokio::test]
async fn test_create_category_duplicate_conflicts() {
    let mut repo = MockCategoryRepository::new();
    repo.expect_find_by_name()
        .returning(|name| Ok(Some(category(name))));
    repo.expect_create().never();

    let service = CategoryManager::new(Arc::new(repo));
    let result = service.create_category("Plumbing".to_string(), None).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_create_category_blank_name_invalid() {
    let service = CategoryManager::new(Arc::new(MockCategoryRepository::new()));
    let result = service.create_category("  ".to_string(), None).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_rename_category_onto_other_conflicts() {
    let mut repo = MockCategoryRepository::new();
    repo.expect_find_by_name()
        .returning(|name| Ok(Some(category(name))));
    repo.expect_update().never();

    let service = CategoryManager::new(Arc::new(repo));
    let changes = CategoryChanges {
        name: Some("Cleaning".to_string()),
        description: None,
    };
    let result = service.update_category(Uuid::new_v4(), changes).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_update_unknown_category_not_found() {
    let mut repo = MockCategoryRepository::new();
    repo.expect_update().returning(|_, _| Err(AppError::NotFound));

    let service = CategoryManager::new(Arc::new(repo));
    let changes = CategoryChanges {
        name: None,
        description: Some("New text".to_string()),
    };
    let result = service.update_category(Uuid::new_v4(), changes).await;
    assert!(matches!(result, Err(AppError::NotFound)));
}

// =============================================================================
// Providers
// =============================================================================

#[tokio::test]
async fn test_provider_find_or_create_is_idempotent() {
    let user_id = Uuid::new_v4();
    let existing = provider(user_id, None);
    let existing_id = existing.id;

    let mut repo = MockProviderRepository::new();
    repo.expect_find_by_user()
        .with(eq(user_id))
        .returning(move |_| Ok(Some(existing.clone())));
    repo.expect_create().never();

    let service = ProviderManager::new(Arc::new(repo));
    let (found, created) = service
        .find_or_create_for_user(NewProvider {
            user_id,
            display_name: "Other".to_string(),
            bio: None,
            phone: None,
        })
        .await
        .unwrap();
    assert_eq!(found.id, existing_id);
    assert!(!created);
}

#[tokio::test]
async fn test_provider_update_by_stranger_forbidden() {
    let owner = Uuid::new_v4();
    let profile = provider(owner, None);
    let id = profile.id;

    let mut repo = MockProviderRepository::new();
    repo.expect_find_by_id()
        .returning(move |_| Ok(Some(profile.clone())));
    repo.expect_update().never();

    let service = ProviderManager::new(Arc::new(repo));
    let result = service
        .update_provider(user(Uuid::new_v4()), id, Default::default())
        .await;
    assert!(matches!(result, Err(AppError::Forbidden)));
}

// =============================================================================
// Listings
// =============================================================================

fn listing_manager(
    listings: MockListingRepository,
    providers: MockProviderRepository,
    categories: MockCategoryRepository,
    hub: &NotificationHub,
) -> ListingManager {
    ListingManager::new(
        Arc::new(listings),
        Arc::new(providers),
        Arc::new(CategoryManager::new(Arc::new(categories))),
        hub.clone(),
    )
}

#[tokio::test]
async fn test_create_listing_requires_provider_profile() {
    let mut providers = MockProviderRepository::new();
    providers.expect_find_by_user().returning(|_| Ok(None));

    let hub = NotificationHub::default();
    let service = listing_manager(
        MockListingRepository::new(),
        providers,
        MockCategoryRepository::new(),
        &hub,
    );
    let result = service
        .create_listing(
            user(Uuid::new_v4()),
            CreateListing {
                category: CategoryRef::Name("Plumbing".to_string()),
                title: "Leak repair".to_string(),
                description: None,
                price_cents: 100,
                image_url: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_create_listing_with_category_name_notifies_owner() {
    let owner = Uuid::new_v4();
    let profile = provider(owner, None);
    let profile_id = profile.id;

    let mut providers = MockProviderRepository::new();
    providers
        .expect_find_by_user()
        .returning(move |_| Ok(Some(profile.clone())));

    let mut categories = MockCategoryRepository::new();
    categories.expect_find_by_name().returning(|_| Ok(None));
    categories
        .expect_create()
        .times(1)
        .returning(|name, _| Ok(category(&name)));

    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_provider_and_title()
        .returning(|_, _| Ok(None));
    listings
        .expect_create()
        .withf(move |l| l.provider_id == profile_id && l.title == "Leak repair")
        .returning(|l| {
            let mut created = listing(l.provider_id, &l.title, l.price_cents);
            created.category_id = l.category_id;
            Ok(created)
        });

    let hub = NotificationHub::default();
    let service = listing_manager(listings, providers, categories, &hub);
    let created = service
        .create_listing(
            user(owner),
            CreateListing {
                category: CategoryRef::Name("Plumbing".to_string()),
                title: " Leak repair ".to_string(),
                description: None,
                price_cents: 4500,
                image_url: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(created.price_cents, 4500);
    assert_eq!(
        messages(&hub, owner),
        vec![(
            "Service 'Leak repair' is now listed".to_string(),
            Severity::Success
        )]
    );
}

#[tokio::test]
async fn test_create_listing_duplicate_title_conflicts() {
    let owner = Uuid::new_v4();
    let profile = provider(owner, None);

    let mut providers = MockProviderRepository::new();
    providers
        .expect_find_by_user()
        .returning(move |_| Ok(Some(profile.clone())));

    let mut listings = MockListingRepository::new();
    listings
        .expect_find_by_provider_and_title()
        .returning(|provider_id, title| Ok(Some(listing(provider_id, title, 100))));
    listings.expect_create().never();

    let hub = NotificationHub::default();
    let service = listing_manager(listings, providers, MockCategoryRepository::new(), &hub);
    let result = service
        .create_listing(
            user(owner),
            CreateListing {
                category: CategoryRef::Id(Uuid::new_v4()),
                title: "Leak repair".to_string(),
                description: None,
                price_cents: 100,
                image_url: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert!(hub.snapshot(owner).is_empty());
}

#[tokio::test]
async fn test_create_listing_negative_price_invalid() {
    let owner = Uuid::new_v4();
    let profile = provider(owner, None);
    let mut providers = MockProviderRepository::new();
    providers
        .expect_find_by_user()
        .returning(move |_| Ok(Some(profile.clone())));

    let hub = NotificationHub::default();
    let service = listing_manager(
        MockListingRepository::new(),
        providers,
        MockCategoryRepository::new(),
        &hub,
    );
    let result = service
        .create_listing(
            user(owner),
            CreateListing {
                category: CategoryRef::Id(Uuid::new_v4()),
                title: "Leak repair".to_string(),
                description: None,
                price_cents: -1,
                image_url: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_search_normalizes_and_paginates() {
    let mut listings = MockListingRepository::new();
    listings
        .expect_search()
        .withf(|q, page| q.search.as_deref() == Some("leak") && page.limit() == 2)
        .returning(|_, _| {
            let provider_id = Uuid::new_v4();
            Ok((
                vec![
                    listing(provider_id, "Leak repair", 100),
                    listing(provider_id, "Leak check", 50),
                ],
                5,
            ))
        });

    let hub = NotificationHub::default();
    let service = listing_manager(
        listings,
        MockProviderRepository::new(),
        MockCategoryRepository::new(),
        &hub,
    );
    let page = service
        .search(
            ListingQuery {
                search: Some("  leak ".to_string()),
                ..Default::default()
            },
            PaginationParams::new(1, 2),
        )
        .await
        .unwrap();

    assert_eq!(page.data.len(), 2);
    assert_eq!(page.meta.total, 5);
    assert_eq!(page.meta.total_pages, 3);
}

#[tokio::test]
async fn test_search_inverted_price_range_invalid() {
    let hub = NotificationHub::default();
    let service = listing_manager(
        MockListingRepository::new(),
        MockProviderRepository::new(),
        MockCategoryRepository::new(),
        &hub,
    );
    let result = service
        .search(
            ListingQuery {
                min_price_cents: Some(500),
                max_price_cents: Some(100),
                ..Default::default()
            },
            PaginationParams::default(),
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_delete_listing_by_non_owner_forbidden() {
    let world = World::new(None);
    let mut listings = world.listings();
    listings.expect_delete().never();

    let hub = NotificationHub::default();
    let service = listing_manager(
        listings,
        world.providers(),
        MockCategoryRepository::new(),
        &hub,
    );
    let result = service
        .delete_listing(user(world.client), world.listing.id)
        .await;
    assert!(matches!(result, Err(AppError::Forbidden)));
}

// =============================================================================
// Hires
// =============================================================================

fn hire_manager(world: &World, hires: MockHireRepository, hub: &NotificationHub) -> HireManager {
    HireManager::new(
        Arc::new(hires),
        Arc::new(world.listings()),
        Arc::new(world.providers()),
        hub.clone(),
    )
}

#[tokio::test]
async fn test_cannot_hire_own_service() {
    let world = World::new(None);
    let mut hires = MockHireRepository::new();
    hires.expect_create().never();

    let hub = NotificationHub::default();
    let service = hire_manager(&world, hires, &hub);
    let result = service
        .create_hire(
            user(world.provider_user),
            CreateHire {
                service_id: world.listing.id,
                scheduled_for: None,
                notes: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_create_hire_notifies_both_parties() {
    let world = World::new(None);
    let mut hires = MockHireRepository::new();
    hires
        .expect_create()
        .returning(|h| Ok(hire(h.service_id, h.client_id, HireStatus::Pending)));

    let hub = NotificationHub::default();
    let service = hire_manager(&world, hires, &hub);
    let created = service
        .create_hire(
            user(world.client),
            CreateHire {
                service_id: world.listing.id,
                scheduled_for: None,
                notes: Some("Kitchen sink".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(created.status, HireStatus::Pending);
    assert_eq!(
        messages(&hub, world.provider_user),
        vec![(
            "New hire request for 'Leak repair'".to_string(),
            Severity::Info
        )]
    );
    assert_eq!(
        messages(&hub, world.client),
        vec![(
            "Hire request sent for 'Leak repair'".to_string(),
            Severity::Success
        )]
    );
}

#[tokio::test]
async fn test_illegal_hire_transition_is_validation_error() {
    let world = World::new(None);
    let existing = hire(world.listing.id, world.client, HireStatus::Completed);
    let id = existing.id;

    let mut hires = MockHireRepository::new();
    hires
        .expect_find_by_id()
        .returning(move |_| Ok(Some(existing.clone())));
    hires.expect_update().never();

    let hub = NotificationHub::default();
    let service = hire_manager(&world, hires, &hub);
    let result = service
        .update_hire(
            user(world.provider_user),
            id,
            HireChanges {
                status: Some(HireStatus::Pending),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_client_cannot_accept_own_hire() {
    let world = World::new(None);
    let existing = hire(world.listing.id, world.client, HireStatus::Pending);
    let id = existing.id;

    let mut hires = MockHireRepository::new();
    hires
        .expect_find_by_id()
        .returning(move |_| Ok(Some(existing.clone())));
    hires.expect_update().never();

    let hub = NotificationHub::default();
    let service = hire_manager(&world, hires, &hub);
    let result = service
        .update_hire(
            user(world.client),
            id,
            HireChanges {
                status: Some(HireStatus::Accepted),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_accepting_hire_notifies_client_only() {
    let world = World::new(None);
    let existing = hire(world.listing.id, world.client, HireStatus::Pending);
    let id = existing.id;
    let stored = existing.clone();

    let mut hires = MockHireRepository::new();
    hires
        .expect_find_by_id()
        .returning(move |_| Ok(Some(existing.clone())));
    hires
        .expect_update()
        .withf(|_, c| c.status == Some(HireStatus::Accepted))
        .returning(move |_, c| {
            let mut updated = stored.clone();
            updated.status = c.status.unwrap_or(updated.status);
            Ok(updated)
        });

    let hub = NotificationHub::default();
    let service = hire_manager(&world, hires, &hub);
    let updated = service
        .update_hire(
            user(world.provider_user),
            id,
            HireChanges {
                status: Some(HireStatus::Accepted),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, HireStatus::Accepted);
    assert_eq!(
        messages(&hub, world.client),
        vec![(
            "Hire for 'Leak repair' is now accepted".to_string(),
            Severity::Info
        )]
    );
    assert!(hub.snapshot(world.provider_user).is_empty());
}

#[tokio::test]
async fn test_stranger_cannot_view_hire() {
    let world = World::new(None);
    let existing = hire(world.listing.id, world.client, HireStatus::Pending);
    let id = existing.id;

    let mut hires = MockHireRepository::new();
    hires
        .expect_find_by_id()
        .returning(move |_| Ok(Some(existing.clone())));

    let hub = NotificationHub::default();
    let service = hire_manager(&world, hires, &hub);
    let result = service.get_hire(user(Uuid::new_v4()), id).await;
    assert!(matches!(result, Err(AppError::Forbidden)));
}

// =============================================================================
// Payments
// =============================================================================

fn payment_manager(
    world: &World,
    payments: MockPaymentRepository,
    hires: MockHireRepository,
    hub: &NotificationHub,
) -> PaymentManager {
    PaymentManager::new(
        Arc::new(payments),
        Arc::new(hires),
        Arc::new(world.listings()),
        Arc::new(world.providers()),
        hub.clone(),
    )
}

fn hires_returning(existing: Hire) -> MockHireRepository {
    let mut hires = MockHireRepository::new();
    hires
        .expect_find_by_id()
        .returning(move |_| Ok(Some(existing.clone())));
    hires
}

#[tokio::test]
async fn test_payment_amount_defaults_to_listing_price() {
    let world = World::new(None);
    let booked = hire(world.listing.id, world.client, HireStatus::Accepted);
    let hire_id = booked.id;

    let mut payments = MockPaymentRepository::new();
    payments
        .expect_create()
        .withf(|p| p.amount_cents == 4500 && p.currency == "USD")
        .returning(|p| {
            let mut created = payment(p.hire_id, PaymentStatus::Pending);
            created.amount_cents = p.amount_cents;
            Ok(created)
        });

    let hub = NotificationHub::default();
    let service = payment_manager(&world, payments, hires_returning(booked), &hub);
    let created = service
        .create_payment(
            user(world.client),
            CreatePayment {
                hire_id,
                amount_cents: None,
                currency: None,
                method: PaymentMethod::Cash,
                reference: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(created.amount_cents, 4500);
    assert_eq!(
        messages(&hub, world.provider_user),
        vec![(
            "Payment of 45.00 USD started for 'Leak repair'".to_string(),
            Severity::Info
        )]
    );
}

#[tokio::test]
async fn test_only_client_can_pay() {
    let world = World::new(None);
    let booked = hire(world.listing.id, world.client, HireStatus::Accepted);
    let hire_id = booked.id;

    let mut payments = MockPaymentRepository::new();
    payments.expect_create().never();

    let hub = NotificationHub::default();
    let service = payment_manager(&world, payments, hires_returning(booked), &hub);
    let result = service
        .create_payment(
            user(world.provider_user),
            CreatePayment {
                hire_id,
                amount_cents: Some(100),
                currency: None,
                method: PaymentMethod::Card,
                reference: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_failed_payment_notifies_client_with_error() {
    let world = World::new(None);
    let booked = hire(world.listing.id, world.client, HireStatus::Accepted);
    let existing = payment(booked.id, PaymentStatus::Pending);
    let payment_id = existing.id;
    let stored = existing.clone();

    let mut payments = MockPaymentRepository::new();
    payments
        .expect_find_by_id()
        .returning(move |_| Ok(Some(existing.clone())));
    payments.expect_update().returning(move |_, c| {
        let mut updated = stored.clone();
        updated.status = c.status.unwrap_or(updated.status);
        Ok(updated)
    });

    let hub = NotificationHub::default();
    let service = payment_manager(&world, payments, hires_returning(booked), &hub);
    service
        .update_payment(
            user(world.provider_user),
            payment_id,
            PaymentChanges {
                status: Some(PaymentStatus::Failed),
                reference: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(
        messages(&hub, world.client),
        vec![(
            "Payment of 45.00 USD for 'Leak repair' is failed".to_string(),
            Severity::Error
        )]
    );
}

#[tokio::test]
async fn test_refund_of_pending_payment_rejected() {
    let world = World::new(None);
    let booked = hire(world.listing.id, world.client, HireStatus::Accepted);
    let existing = payment(booked.id, PaymentStatus::Pending);
    let payment_id = existing.id;

    let mut payments = MockPaymentRepository::new();
    payments
        .expect_find_by_id()
        .returning(move |_| Ok(Some(existing.clone())));
    payments.expect_update().never();

    let hub = NotificationHub::default();
    let service = payment_manager(&world, payments, hires_returning(booked), &hub);
    let result = service
        .update_payment(
            user(world.client),
            payment_id,
            PaymentChanges {
                status: Some(PaymentStatus::Refunded),
                reference: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_whatsapp_link_targets_provider_phone() {
    let world = World::new(Some("+1 (555) 010-9999"));
    let booked = hire(world.listing.id, world.client, HireStatus::Accepted);
    let existing = payment(booked.id, PaymentStatus::Pending);
    let payment_id = existing.id;

    let mut payments = MockPaymentRepository::new();
    payments
        .expect_find_by_id()
        .returning(move |_| Ok(Some(existing.clone())));

    let hub = NotificationHub::default();
    let service = payment_manager(&world, payments, hires_returning(booked), &hub);
    let link = service
        .whatsapp_link(user(world.client), payment_id)
        .await
        .unwrap();

    assert_eq!(link.phone, "15550109999");
    assert!(link.url.starts_with("https://wa.me/15550109999?text=Hello%20Ana"));
    assert!(link.message.contains("45.00 USD"));
    assert!(link.message.contains(&payment_id.to_string()));
}

#[tokio::test]
async fn test_whatsapp_link_without_phone_invalid() {
    let world = World::new(None);
    let booked = hire(world.listing.id, world.client, HireStatus::Accepted);
    let existing = payment(booked.id, PaymentStatus::Pending);
    let payment_id = existing.id;

    let mut payments = MockPaymentRepository::new();
    payments
        .expect_find_by_id()
        .returning(move |_| Ok(Some(existing.clone())));

    let hub = NotificationHub::default();
    let service = payment_manager(&world, payments, hires_returning(booked), &hub);
    let result = service.whatsapp_link(user(world.client), payment_id).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_delete_payment_requires_admin() {
    let world = World::new(None);
    let mut payments = MockPaymentRepository::new();
    payments.expect_delete().never();

    let hub = NotificationHub::default();
    let service = payment_manager(&world, payments, MockHireRepository::new(), &hub);
    let result = service
        .delete_payment(user(world.client), Uuid::new_v4())
        .await;
    assert!(matches!(result, Err(AppError::Forbidden)));
}
