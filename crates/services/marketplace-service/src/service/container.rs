//! Service container - wires repositories into services.

use std::sync::Arc;

use common::JwtConfig;
use notification_service_lib::NotificationHub;
use sea_orm::DatabaseConnection;

use super::{
    AuthService, Authenticator, CategoryManager, CategoryService, HireManager, HireService,
    ListingManager, ListingService, PaymentManager, PaymentService, ProviderManager,
    ProviderService, UserManager, UserService,
};
use crate::repository::{
    CategoryStore, HireStore, ListingStore, PaymentStore, ProviderStore, UserStore,
};

/// All marketplace services behind their traits.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub users: Arc<dyn UserService>,
    pub categories: Arc<dyn CategoryService>,
    pub providers: Arc<dyn ProviderService>,
    pub listings: Arc<dyn ListingService>,
    pub hires: Arc<dyn HireService>,
    pub payments: Arc<dyn PaymentService>,
}

impl Services {
    /// Build every service on top of one database connection.
    pub fn from_connection(
        db: DatabaseConnection,
        jwt: JwtConfig,
        notifications: NotificationHub,
    ) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        let category_repo = Arc::new(CategoryStore::new(db.clone()));
        let provider_repo = Arc::new(ProviderStore::new(db.clone()));
        let listing_repo = Arc::new(ListingStore::new(db.clone()));
        let hire_repo = Arc::new(HireStore::new(db.clone()));
        let payment_repo = Arc::new(PaymentStore::new(db));

        let categories: Arc<dyn CategoryService> = Arc::new(CategoryManager::new(category_repo));

        Self {
            auth: Arc::new(Authenticator::new(
                user_repo.clone(),
                notifications.clone(),
                jwt,
            )),
            users: Arc::new(UserManager::new(user_repo, notifications.clone())),
            providers: Arc::new(ProviderManager::new(provider_repo.clone())),
            listings: Arc::new(ListingManager::new(
                listing_repo.clone(),
                provider_repo.clone(),
                categories.clone(),
                notifications.clone(),
            )),
            hires: Arc::new(HireManager::new(
                hire_repo.clone(),
                listing_repo.clone(),
                provider_repo.clone(),
                notifications.clone(),
            )),
            payments: Arc::new(PaymentManager::new(
                payment_repo,
                hire_repo,
                listing_repo,
                provider_repo,
                notifications,
            )),
            categories,
        }
    }
}
