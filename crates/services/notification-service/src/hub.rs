//! Per-user registry of notification centers.

use std::collections::HashMap;
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use uuid::Uuid;

use crate::center::{NotificationCenter, DEFAULT_TTL};
use crate::context::NotificationContext;
use crate::notification::{Notification, NotificationId, Severity};

type Centers = Mutex<HashMap<Uuid, NotificationCenter>>;

fn lock_centers(centers: &Centers) -> MutexGuard<'_, HashMap<Uuid, NotificationCenter>> {
    centers.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Drops the owner's center if it is empty and nothing else refers to it.
fn evict_if_idle(centers: &Centers, owner: Uuid) -> bool {
    let mut centers = lock_centers(centers);
    let idle = centers.get(&owner).is_some_and(NotificationCenter::is_idle);
    if idle {
        centers.remove(&owner);
        tracing::debug!(%owner, "Evicted idle notification center");
    }
    idle
}

/// Owns one [`NotificationCenter`] per user.
///
/// Centers are created lazily on first use. A center is evicted once it is
/// empty and no handle or context outside the hub refers to it, so the hub
/// only holds users with something to show. [`NotificationHub::remove`] drops
/// a center unconditionally.
#[derive(Clone)]
pub struct NotificationHub {
    ttl: Duration,
    centers: Arc<Centers>,
    /// Ids stay unique across evictions
    ids: Arc<AtomicU64>,
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl NotificationHub {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            centers: Arc::new(Mutex::new(HashMap::new())),
            ids: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, NotificationCenter>> {
        lock_centers(&self.centers)
    }

    /// Runs `f` on the owner's center, if any, then evicts it when idle.
    fn with_existing<T>(&self, owner: Uuid, f: impl FnOnce(&NotificationCenter) -> T) -> Option<T> {
        let center = self.lock().get(&owner).cloned()?;
        let result = f(&center);
        drop(center);
        evict_if_idle(&self.centers, owner);
        Some(result)
    }

    /// Returns the owner's center, creating it if needed.
    pub fn center_for(&self, owner: Uuid) -> NotificationCenter {
        self.lock()
            .entry(owner)
            .or_insert_with(|| {
                tracing::debug!(%owner, "Creating notification center");
                let centers = Arc::downgrade(&self.centers);
                NotificationCenter::with_idle_hook(
                    self.ttl,
                    Arc::clone(&self.ids),
                    Arc::new(move || {
                        if let Some(centers) = centers.upgrade() {
                            evict_if_idle(&centers, owner);
                        }
                    }),
                )
            })
            .clone()
    }

    pub fn context_for(&self, owner: Uuid) -> NotificationContext {
        self.center_for(owner).context()
    }

    pub fn notify(
        &self,
        owner: Uuid,
        message: impl Into<String>,
        severity: Severity,
    ) -> NotificationId {
        self.center_for(owner).notify(message, severity)
    }

    /// Active notifications of `owner`; empty when the owner has no center.
    pub fn snapshot(&self, owner: Uuid) -> Vec<Notification> {
        self.with_existing(owner, NotificationCenter::snapshot)
            .unwrap_or_default()
    }

    pub fn dismiss(&self, owner: Uuid, id: NotificationId) -> bool {
        self.with_existing(owner, |center| center.dismiss(id))
            .unwrap_or(false)
    }

    pub fn clear(&self, owner: Uuid) -> usize {
        self.with_existing(owner, NotificationCenter::clear)
            .unwrap_or(0)
    }

    /// Drops the owner's center. Outstanding contexts for it stop working.
    pub fn remove(&self, owner: Uuid) -> bool {
        let removed = self.lock().remove(&owner);
        if let Some(center) = removed {
            center.clear();
            tracing::debug!(%owner, "Removed notification center");
            true
        } else {
            false
        }
    }

    /// Number of owners with a center in the hub.
    pub fn owners(&self) -> usize {
        self.lock().len()
    }
}

impl std::fmt::Debug for NotificationHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationHub")
            .field("ttl", &self.ttl)
            .field("owners", &self.owners())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NotificationError;

    /// Lets spawned timer tasks run after the clock moved.
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_centers_are_isolated_per_owner() {
        let hub = NotificationHub::default();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        hub.notify(alice, "for alice", Severity::Info);
        hub.notify(bob, "for bob", Severity::Warning);

        assert_eq!(hub.snapshot(alice).len(), 1);
        assert_eq!(hub.snapshot(bob)[0].message, "for bob");
        assert_eq!(hub.owners(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_paths_do_not_create_centers() {
        let hub = NotificationHub::default();
        let owner = Uuid::new_v4();

        assert!(hub.snapshot(owner).is_empty());
        assert!(!hub.dismiss(owner, NotificationId(1)));
        assert_eq!(hub.clear(owner), 0);
        assert_eq!(hub.owners(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_center_returned() {
        let hub = NotificationHub::default();
        let owner = Uuid::new_v4();

        let a = hub.context_for(owner);
        let b = hub.context_for(owner);
        assert!(a.same_center(&b));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remove_detaches_contexts() {
        let hub = NotificationHub::default();
        let owner = Uuid::new_v4();
        let ctx = hub.context_for(owner);
        ctx.info("hello").unwrap();

        assert!(hub.remove(owner));
        assert_eq!(ctx.info("again"), Err(NotificationError::OutsideProvider));
        assert!(!hub.remove(owner));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_centers_are_evicted() {
        let hub = NotificationHub::new(Duration::from_millis(10));
        for i in 0..1000 {
            hub.notify(Uuid::new_v4(), format!("n{i}"), Severity::Info);
        }
        assert_eq!(hub.owners(), 1000);

        tokio::time::sleep(Duration::from_millis(50)).await;
        settle().await;
        assert_eq!(hub.owners(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_center_kept_until_last_notification_expires() {
        let hub = NotificationHub::new(Duration::from_millis(100));
        let owner = Uuid::new_v4();
        hub.notify(owner, "first", Severity::Info);
        tokio::time::sleep(Duration::from_millis(50)).await;
        hub.notify(owner, "second", Severity::Info);

        tokio::time::sleep(Duration::from_millis(50)).await;
        settle().await;
        assert_eq!(hub.owners(), 1);
        assert_eq!(hub.snapshot(owner)[0].message, "second");

        tokio::time::sleep(Duration::from_millis(50)).await;
        settle().await;
        assert_eq!(hub.owners(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dismiss_and_clear_evict_empty_centers() {
        let hub = NotificationHub::default();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let id = hub.notify(alice, "one", Severity::Info);
        hub.notify(bob, "a", Severity::Info);
        hub.notify(bob, "b", Severity::Info);

        assert!(hub.dismiss(alice, id));
        assert_eq!(hub.clear(bob), 2);
        assert_eq!(hub.owners(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ids_not_reused_after_eviction() {
        let hub = NotificationHub::default();
        let owner = Uuid::new_v4();
        let first = hub.notify(owner, "one", Severity::Info);
        assert!(hub.dismiss(owner, first));
        assert_eq!(hub.owners(), 0);

        let second = hub.notify(owner, "two", Severity::Info);
        assert_ne!(first, second);
        assert!(!hub.dismiss(owner, first));
        assert_eq!(hub.snapshot(owner).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_context_pins_center() {
        let hub = NotificationHub::new(Duration::from_millis(10));
        let owner = Uuid::new_v4();
        let ctx = hub.context_for(owner);
        ctx.info("hello").unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        settle().await;
        assert_eq!(hub.owners(), 1);
        assert!(ctx.is_attached());
        ctx.info("still here").unwrap();
        assert_eq!(hub.snapshot(owner).len(), 1);

        drop(ctx);
        assert_eq!(hub.clear(owner), 1);
        assert_eq!(hub.owners(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hub_notifications_expire() {
        let hub = NotificationHub::new(Duration::from_millis(500));
        let owner = Uuid::new_v4();
        hub.notify(owner, "short", Severity::Success);

        tokio::time::sleep(Duration::from_millis(500)).await;
        settle().await;
        assert!(hub.snapshot(owner).is_empty());
    }
}
